use crate::foundation::core::{BezPath, Point, Rgba8};
use crate::foundation::error::LabelResult;
use crate::render::surface::{Surface, color_to_cpu, composite_over};
use crate::scene::model::Pattern;

/// Opacity of the stripes and dots fills over the background.
const PATTERN_OPACITY: f32 = 0.15;

/// Paint a procedural pattern over an existing surface.
///
/// `Pattern::None` is a strict no-op: the surface bytes are untouched.
/// Deterministic for identical inputs.
pub fn paint(
    pattern: Pattern,
    surface: &mut Surface,
    accent: Rgba8,
) -> LabelResult<()> {
    if pattern == Pattern::None {
        return Ok(());
    }
    let width = surface.width();
    let height = surface.height();
    let mut scratch = Surface::new(width, height)?;
    let mut ctx = vello_cpu::RenderContext::new(width as u16, height as u16);
    paint_into(
        &mut ctx,
        pattern,
        f64::from(width),
        f64::from(height),
        accent,
    );
    ctx.flush();
    ctx.render_to_pixmap(scratch.pixmap_mut());
    composite_over(surface, &scratch, 1.0)
}

/// Emit the pattern geometry into an open render context.
///
/// The caller owns the context transform; geometry is in destination pixels.
pub(crate) fn paint_into(
    ctx: &mut vello_cpu::RenderContext,
    pattern: Pattern,
    w: f64,
    h: f64,
    accent: Rgba8,
) {
    match pattern {
        Pattern::None => {}
        Pattern::Stripes => {
            let stripe_w = (w / 20.0).floor().max(6.0);
            let mut path = BezPath::new();
            let mut x = -h;
            while x < w + h {
                path.move_to(Point::new(x, 0.0));
                path.line_to(Point::new(x + stripe_w, 0.0));
                path.line_to(Point::new(x + stripe_w - h, h));
                path.line_to(Point::new(x - h, h));
                path.close_path();
                x += stripe_w * 2.0;
            }
            ctx.set_paint(color_to_cpu(accent));
            ctx.push_opacity_layer(PATTERN_OPACITY);
            ctx.fill_path(&crate::render::surface::bezpath_to_cpu(&path));
            ctx.pop_layer();
        }
        Pattern::Dots => {
            let step = (w.min(h) / 12.0).floor().max(10.0);
            let radius = step / 6.0;
            let mut path = BezPath::new();
            let mut y = step / 2.0;
            while y < h {
                let mut x = step / 2.0;
                while x < w {
                    let circle = kurbo::Circle::new((x, y), radius);
                    for el in kurbo::Shape::path_elements(&circle, 0.1) {
                        path.push(el);
                    }
                    x += step;
                }
                y += step;
            }
            ctx.set_paint(color_to_cpu(accent));
            ctx.push_opacity_layer(PATTERN_OPACITY);
            ctx.fill_path(&crate::render::surface::bezpath_to_cpu(&path));
            ctx.pop_layer();
        }
        Pattern::Waves => {
            let amplitude = h / 12.0;
            let period = w / 6.0;
            let line_width = (h / 120.0).max(2.0);
            let mut spine = BezPath::new();
            let mut x = 0.0;
            while x <= w {
                let y = h / 2.0 + ((x / period) * std::f64::consts::TAU).sin() * amplitude;
                if x == 0.0 {
                    spine.move_to(Point::new(x, y));
                } else {
                    spine.line_to(Point::new(x, y));
                }
                x += 1.0;
            }
            let stroked = kurbo::stroke(
                spine,
                &kurbo::Stroke::new(line_width),
                &kurbo::StrokeOpts::default(),
                0.25,
            );
            ctx.set_paint(color_to_cpu(accent));
            ctx.fill_path(&crate::render::surface::bezpath_to_cpu(&stroked));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pattern.rs"]
mod tests;
