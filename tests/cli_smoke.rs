use std::path::PathBuf;

fn bin() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_driftfield")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "driftfield.exe"
            } else {
                "driftfield"
            });
            p
        })
}

#[test]
fn cli_init_then_frame_writes_a_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let scenario_path = dir.join("scenario.json");
    let out_path = dir.join("frame.png");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(bin())
        .args(["init", "--mode", "starfield", "--width", "128", "--height", "96", "--out"])
        .arg(&scenario_path)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(scenario_path.exists());

    let scenario: driftfield::Scenario =
        serde_json::from_reader(std::fs::File::open(&scenario_path).unwrap()).unwrap();
    scenario.validate().unwrap();
    assert_eq!(scenario.viewport, driftfield::Viewport::new(128, 96));

    let status = std::process::Command::new(bin())
        .args(["frame", "--frame", "5", "--in"])
        .arg(&scenario_path)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out_path.exists());
}

#[test]
fn cli_frame_fails_cleanly_on_a_missing_scenario() {
    let status = std::process::Command::new(bin())
        .args([
            "frame",
            "--in",
            "target/cli_smoke/does_not_exist.json",
            "--frame",
            "0",
            "--out",
            "target/cli_smoke/never.png",
        ])
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn cli_frame_rejects_an_out_of_range_index() {
    let dir = PathBuf::from("target").join("cli_smoke_range");
    std::fs::create_dir_all(&dir).unwrap();
    let scenario_path = dir.join("scenario.json");

    let status = std::process::Command::new(bin())
        .args(["init", "--out"])
        .arg(&scenario_path)
        .status()
        .unwrap();
    assert!(status.success());

    // Presets run 600 frames; frame 600 is one past the end.
    let status = std::process::Command::new(bin())
        .args(["frame", "--frame", "600", "--in"])
        .arg(&scenario_path)
        .arg("--out")
        .arg(dir.join("never.png"))
        .status()
        .unwrap();
    assert!(!status.success());
}
