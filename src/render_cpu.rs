use kurbo::{Point, Shape as _, Vec2};

use crate::{
    core::{Rgba8, Viewport},
    error::{DriftfieldError, DriftfieldResult},
    scene::{DrawOp, Scene},
};

/// One rendered frame: RGBA8 pixels, premultiplied alpha.
#[derive(Clone, Debug)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// CPU rasterizer. Keeps its pixmap across frames and rebuilds it lazily
/// when the scene viewport changes size.
pub struct CpuRenderer {
    surface: Option<CpuSurface>,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRenderer {
    pub fn new() -> Self {
        Self { surface: None }
    }

    pub fn render(&mut self, scene: &Scene) -> DriftfieldResult<RgbaFrame> {
        let background = premul_rgba8(scene.background);
        let surface = self.ensure_surface(scene.viewport)?;
        clear_pixmap(&mut surface.pixmap, background);

        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for op in &scene.ops {
            draw_op(&mut ctx, op);
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);

        Ok(RgbaFrame {
            width: scene.viewport.width,
            height: scene.viewport.height,
            data: surface.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn ensure_surface(&mut self, viewport: Viewport) -> DriftfieldResult<&mut CpuSurface> {
        if viewport.is_degenerate() {
            return Err(DriftfieldError::render(
                "cannot render to a zero-area viewport",
            ));
        }
        let width: u16 = viewport
            .width
            .try_into()
            .map_err(|_| DriftfieldError::render("surface width exceeds u16"))?;
        let height: u16 = viewport
            .height
            .try_into()
            .map_err(|_| DriftfieldError::render("surface height exceeds u16"))?;

        let stale = match &self.surface {
            Some(s) => s.width != width || s.height != height,
            None => true,
        };
        if stale {
            self.surface = Some(CpuSurface {
                width,
                height,
                pixmap: vello_cpu::Pixmap::new(width, height),
            });
        }
        self.surface
            .as_mut()
            .ok_or_else(|| DriftfieldError::render("surface missing after ensure (bug)"))
    }
}

fn draw_op(ctx: &mut vello_cpu::RenderContext, op: &DrawOp) {
    match op {
        DrawOp::Disc {
            center,
            radius,
            color,
        } => {
            if color.a == 0 || *radius <= 0.0 {
                return;
            }
            ctx.set_paint(color_to_cpu(*color));
            let path = kurbo::Circle::new(*center, *radius).to_path(0.1);
            ctx.fill_path(&bezpath_to_cpu(&path));
        }
        DrawOp::Segment {
            from,
            to,
            width,
            color,
        } => {
            if color.a == 0 {
                return;
            }
            let Some(path) = segment_quad(*from, *to, *width) else {
                return;
            };
            ctx.set_paint(color_to_cpu(*color));
            ctx.fill_path(&bezpath_to_cpu(&path));
        }
    }
}

/// Expand a line segment into a filled quad of the given stroke width.
/// Returns `None` for zero-length or zero-width segments.
fn segment_quad(from: Point, to: Point, width: f64) -> Option<kurbo::BezPath> {
    let along = to - from;
    let length = along.hypot();
    if length <= 1e-9 || width <= 0.0 {
        return None;
    }
    let normal = Vec2::new(-along.y, along.x) * (0.5 * width / length);

    let mut path = kurbo::BezPath::new();
    path.move_to(from + normal);
    path.line_to(to + normal);
    path.line_to(to - normal);
    path.line_to(from - normal);
    path.close_path();
    Some(path)
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn premul_rgba8(c: Rgba8) -> [u8; 4] {
    fn premul(c: u8, a: u8) -> u8 {
        (((u16::from(c) * u16::from(a)) + 127) / 255) as u8
    }
    [premul(c.r, c.a), premul(c.g, c.a), premul(c.b, c.a), c.a]
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}
