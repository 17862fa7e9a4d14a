use std::sync::Arc;

use crate::foundation::core::{
    Affine, Dpi, PixelDims, Point, Rgba8, to_pixel_dimensions,
};
use crate::foundation::error::LabelResult;
use crate::render::assets::{RenderAssets, qr_bitmap};
use crate::render::overlay::{fit_contain, placement};
use crate::render::pattern;
use crate::render::surface::{
    self, Surface, affine_to_cpu, bezpath_to_cpu, color_to_cpu, image_paint_from_premul,
};
use crate::render::text::{
    LayoutMeasurer, TextBrush, TextLayoutEngine, TextStyle, truncate_to_width,
};
use crate::scene::model::{FontWeightClass, SceneState};
use crate::shape::registry::{self, CapStyle, ShapeDefinition};

/// Fraction of the label height used as padding on every side.
const LABEL_PAD_FRAC: f64 = 0.08;
/// Title glyph size as a fraction of the inner label height.
const TITLE_SIZE_FRAC: f64 = 0.22;
/// Tagline glyph size as a fraction of the inner label height.
const TAGLINE_SIZE_FRAC: f64 = 0.12;
/// Gap between title and tagline as a fraction of the inner label height.
const TAGLINE_GAP_FRAC: f64 = 0.05;
/// Vertical position of the divider as a fraction of the inner label height.
const DIVIDER_POS_FRAC: f64 = 0.45;
/// Divider bar thickness as a fraction of the label height.
const DIVIDER_H_FRAC: f64 = 0.01;
/// Logo width budget as a fraction of the inner label width.
const LOGO_W_FRAC: f64 = 0.30;
/// Logo height budget as a fraction of the inner label height.
const LOGO_H_FRAC: f64 = 0.28;
/// QR glyph edge as a fraction of the smaller inner label dimension.
const QR_FRAC: f64 = 0.32;

/// Renders a [`SceneState`] into pixels.
///
/// One compositor owns a reusable raster context and text engine; every
/// public render call repaints a fresh surface from a blank state, so a
/// single compositor can serve both the preview loop and on-demand exports
/// (which allocate their own destination).
pub struct SceneCompositor {
    ctx: Option<vello_cpu::RenderContext>,
    text: TextLayoutEngine,
}

impl Default for SceneCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneCompositor {
    /// Construct a compositor with fresh contexts.
    pub fn new() -> Self {
        Self {
            ctx: None,
            text: TextLayoutEngine::new(),
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> LabelResult<R>,
    ) -> LabelResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    /// Render the label frame at the given pixel dimensions.
    ///
    /// Fixed paint order: background, pattern, title, tagline, divider,
    /// logo, QR. Every offset and size is a fraction of the destination
    /// dimensions, so the same scene renders correctly at preview and at
    /// export resolution.
    pub fn render_label(
        &mut self,
        scene: &SceneState,
        assets: &RenderAssets,
        width: u32,
        height: u32,
    ) -> LabelResult<Surface> {
        let mut out = Surface::new(width, height)?;
        let wf = f64::from(width);
        let hf = f64::from(height);
        let pad = (hf * LABEL_PAD_FRAC).floor();
        let inner_w = wf - pad * 2.0;
        let inner_h = hf - pad * 2.0;

        self.with_ctx_mut(width as u16, height as u16, |this, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(scene.label_background));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, wf, hf));

            pattern::paint_into(ctx, scene.pattern, wf, hf, scene.accent_color);

            let title_size = (inner_h * TITLE_SIZE_FRAC).floor();
            let title_y = pad;
            if let Some(font) = assets.font(&scene.font_family).cloned() {
                let brush = brush_of(scene.text_color);

                let title_style = TextStyle {
                    size_px: title_size as f32,
                    weight: FontWeightClass::Bold.value(),
                    tracking_px: 0.0,
                    brush,
                };
                this.draw_line_centered(
                    ctx,
                    &scene.product_name,
                    &font,
                    title_style,
                    inner_w,
                    wf,
                    title_y,
                )?;

                let tagline_size = (inner_h * TAGLINE_SIZE_FRAC).floor();
                let tagline_y = title_y + title_size + (inner_h * TAGLINE_GAP_FRAC).floor();
                let tagline_style = TextStyle {
                    size_px: tagline_size as f32,
                    weight: FontWeightClass::Medium.value(),
                    tracking_px: 0.0,
                    brush,
                };
                this.draw_line_centered(
                    ctx,
                    &scene.tagline,
                    &font,
                    tagline_style,
                    inner_w,
                    wf,
                    tagline_y,
                )?;
            }

            let divider_h = (hf * DIVIDER_H_FRAC).floor().max(4.0);
            let divider_y = pad + (inner_h * DIVIDER_POS_FRAC).floor();
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(scene.accent_color));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                pad,
                divider_y,
                pad + inner_w,
                divider_y + divider_h,
            ));

            if let Some(logo) = &assets.logo {
                let (draw_w, draw_h) = fit_contain(
                    f64::from(logo.width),
                    f64::from(logo.height),
                    inner_w * LOGO_W_FRAC,
                    inner_h * LOGO_H_FRAC,
                );
                let tr = Affine::translate((pad, hf - pad - draw_h))
                    * Affine::scale_non_uniform(
                        draw_w / f64::from(logo.width),
                        draw_h / f64::from(logo.height),
                    );
                ctx.set_transform(affine_to_cpu(tr));
                ctx.set_paint(image_paint_from_premul(
                    &logo.rgba8_premul,
                    logo.width,
                    logo.height,
                )?);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(logo.width),
                    f64::from(logo.height),
                ));
            }

            if let Some(modules) = &assets.qr {
                let qr_size = (inner_w.min(inner_h) * QR_FRAC).floor();
                if qr_size >= 1.0 {
                    let bitmap = qr_bitmap(modules, qr_size as u32)?;
                    let tr = Affine::translate((wf - pad - qr_size, hf - pad - qr_size));
                    ctx.set_transform(affine_to_cpu(tr));
                    ctx.set_paint(image_paint_from_premul(
                        &bitmap.rgba8_premul,
                        bitmap.width,
                        bitmap.height,
                    )?);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, qr_size, qr_size));
                }
            }

            ctx.flush();
            ctx.render_to_pixmap(out.pixmap_mut());
            Ok(())
        })?;

        Ok(out)
    }

    /// Render the label at preview resolution (longest edge capped).
    pub fn render_label_preview(
        &mut self,
        scene: &SceneState,
        assets: &RenderAssets,
        max_edge_px: u32,
    ) -> LabelResult<Surface> {
        let dims = preview_dimensions(scene, max_edge_px)?;
        self.render_label(scene, assets, dims.width, dims.height)
    }

    /// Render the full container mockup at the given pixel dimensions.
    ///
    /// Paint order: container body and cap, silhouette-clipped body content
    /// (overlay image, then text layers in array order), then the label
    /// frame placed per the scene's label geometry.
    pub fn render_mockup(
        &mut self,
        scene: &SceneState,
        assets: &RenderAssets,
        width: u32,
        height: u32,
    ) -> LabelResult<Surface> {
        let shape = registry::lookup(scene.shape)?;
        let mut out = Surface::new(width, height)?;
        let wf = f64::from(width);
        let hf = f64::from(height);
        let s = (wf / shape.view_box.width).min(hf / shape.view_box.height);
        let base = Affine::translate((
            (wf - shape.view_box.width * s) / 2.0,
            (hf - shape.view_box.height * s) / 2.0,
        )) * Affine::scale(s);

        // Body and cap render directly into the destination.
        self.with_ctx_mut(width as u16, height as u16, |_, ctx| {
            ctx.set_transform(affine_to_cpu(base));
            ctx.set_paint(color_to_cpu(scene.bottle_color));
            ctx.fill_path(&bezpath_to_cpu(&shape.outline));
            draw_cap(ctx, shape, scene.cap, scene.cap_color);
            ctx.flush();
            ctx.render_to_pixmap(out.pixmap_mut());
            Ok(())
        })?;

        // Body content is accumulated separately, multiplied by the
        // silhouette alpha, then composited over; no overlay or layer pixel
        // can land outside the outline.
        let has_layers = scene
            .text_layers
            .iter()
            .any(|l| assets.font(&l.font_family).is_some() && !l.text.is_empty());
        if assets.overlay.is_some() || has_layers {
            let mut content = Surface::new(width, height)?;
            self.with_ctx_mut(width as u16, height as u16, |this, ctx| {
                if let (Some(state), Some(img)) = (&scene.overlay_image, &assets.overlay) {
                    let rect = placement(
                        state.fit,
                        f64::from(img.width),
                        f64::from(img.height),
                        shape.printable_rect,
                        state.scale,
                        state.offset_x,
                        state.offset_y,
                    );
                    let tr = base
                        * Affine::translate((rect.x0, rect.y0))
                        * Affine::scale_non_uniform(
                            rect.width() / f64::from(img.width),
                            rect.height() / f64::from(img.height),
                        );
                    ctx.set_transform(affine_to_cpu(tr));
                    ctx.set_paint(image_paint_from_premul(
                        &img.rgba8_premul,
                        img.width,
                        img.height,
                    )?);
                    let opacity = state.opacity.clamp(0.0, 1.0) as f32;
                    if opacity < 1.0 {
                        ctx.push_opacity_layer(opacity);
                    }
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        f64::from(img.width),
                        f64::from(img.height),
                    ));
                    if opacity < 1.0 {
                        ctx.pop_layer();
                    }
                }

                for layer in &scene.text_layers {
                    if layer.text.is_empty() {
                        continue;
                    }
                    let Some(font) = assets.font(&layer.font_family).cloned() else {
                        continue;
                    };
                    let style = TextStyle {
                        size_px: layer.size_px as f32,
                        weight: layer.weight.value(),
                        tracking_px: layer.tracking_px as f32,
                        brush: brush_of(layer.color),
                    };
                    let layout = this.text.layout_line(&layer.text, &font, style)?;
                    let tr = base
                        * Affine::translate((layer.x, layer.y))
                        * Affine::rotate(layer.rotation_deg.to_radians());
                    let opacity = layer.opacity.clamp(0.0, 1.0) as f32;
                    if opacity < 1.0 {
                        ctx.push_opacity_layer(opacity);
                    }
                    draw_layout(ctx, &layout, &font, tr);
                    if opacity < 1.0 {
                        ctx.pop_layer();
                    }
                }

                ctx.flush();
                ctx.render_to_pixmap(content.pixmap_mut());
                Ok(())
            })?;

            let mut mask = Surface::new(width, height)?;
            self.with_ctx_mut(width as u16, height as u16, |_, ctx| {
                ctx.set_transform(affine_to_cpu(base));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
                ctx.fill_path(&bezpath_to_cpu(&shape.outline));
                ctx.flush();
                ctx.render_to_pixmap(mask.pixmap_mut());
                Ok(())
            })?;

            surface::apply_alpha_mask(content.data_mut(), mask.data())?;
            surface::composite_over(&mut out, &content, 1.0)?;
        }

        // Label frame, placed via the shape's linear mm -> local-unit scale.
        let upm = shape.units_per_mm;
        let g = &scene.label_geometry;
        let label_w_units = g.width_mm * upm;
        let label_h_units = g.height_mm * upm;
        let origin = Point::new(
            shape.printable_rect.x0 + g.offset_x_mm * upm,
            shape.printable_rect.y0 + g.offset_y_mm * upm,
        );
        let label_px_w = ((label_w_units * s).round() as u32).max(1);
        let label_px_h = ((label_h_units * s).round() as u32).max(1);
        let label_frame = self.render_label(scene, assets, label_px_w, label_px_h)?;

        let mut placed = Surface::new(width, height)?;
        self.with_ctx_mut(width as u16, height as u16, |_, ctx| {
            let tr = base
                * Affine::translate((origin.x, origin.y))
                * Affine::scale_non_uniform(
                    label_w_units / f64::from(label_px_w),
                    label_h_units / f64::from(label_px_h),
                );
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint(label_frame.as_image_paint()?);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(label_px_w),
                f64::from(label_px_h),
            ));
            ctx.flush();
            ctx.render_to_pixmap(placed.pixmap_mut());
            Ok(())
        })?;
        surface::composite_over(&mut out, &placed, 1.0)?;

        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_line_centered(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        font: &Arc<Vec<u8>>,
        style: TextStyle,
        max_width: f64,
        dest_width: f64,
        y: f64,
    ) -> LabelResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let display = {
            let mut measurer = LayoutMeasurer::new(&mut self.text, font, style);
            truncate_to_width(text, max_width, &mut measurer)
        };
        let layout = self.text.layout_line(&display, font, style)?;
        let x = (dest_width - f64::from(layout.full_width())) / 2.0;
        draw_layout(ctx, &layout, font, Affine::translate((x, y)));
        Ok(())
    }
}

fn brush_of(color: Rgba8) -> TextBrush {
    TextBrush {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrush>,
    font_bytes: &[u8],
    transform: Affine,
) {
    let font =
        vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes.to_vec()), 0);
    ctx.set_transform(affine_to_cpu(transform));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn draw_cap(
    ctx: &mut vello_cpu::RenderContext,
    shape: &ShapeDefinition,
    cap: CapStyle,
    cap_color: Rgba8,
) {
    let cx = shape.cap_anchor.x;
    let top = shape.cap_anchor.y;
    let body = color_to_cpu(cap_color);
    let shade20 = vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 0x20);
    let shade30 = vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 0x30);

    match cap {
        CapStyle::Flat => {
            fill_rounded(ctx, cx - 30.0, top + 20.0, cx + 30.0, top + 60.0, 6.0, body);
            fill_rounded(ctx, cx - 30.0, top + 15.0, cx + 30.0, top + 25.0, 3.0, shade20);
        }
        CapStyle::Pump => {
            fill_rounded(ctx, cx - 30.0, top + 10.0, cx + 30.0, top + 24.0, 3.0, shade20);
            fill_rounded(ctx, cx - 35.0, top + 20.0, cx + 35.0, top + 58.0, 8.0, body);
            fill_rounded(ctx, cx + 20.0, top + 5.0, cx + 70.0, top + 15.0, 5.0, body);
            let tip = kurbo::Circle::new((cx + 70.0, top + 10.0), 5.0);
            let mut p = vello_cpu::kurbo::BezPath::new();
            for el in kurbo::Shape::path_elements(&tip, 0.1) {
                p.push(el);
            }
            ctx.set_paint(body);
            ctx.fill_path(&p);
        }
        CapStyle::Flip => {
            fill_rounded(ctx, cx - 30.0, top + 20.0, cx + 30.0, top + 60.0, 6.0, body);
            fill_rounded(ctx, cx - 35.0, top + 10.0, cx + 35.0, top + 24.0, 4.0, shade20);
            fill_rounded(ctx, cx - 5.0, top + 8.0, cx + 5.0, top + 16.0, 2.0, shade30);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn fill_rounded(
    ctx: &mut vello_cpu::RenderContext,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    radius: f64,
    paint: vello_cpu::peniko::Color,
) {
    let rr = kurbo::RoundedRect::new(x0, y0, x1, y1, radius);
    let mut p = vello_cpu::kurbo::BezPath::new();
    for el in kurbo::Shape::path_elements(&rr, 0.1) {
        p.push(el);
    }
    ctx.set_paint(paint);
    ctx.fill_path(&p);
}

/// Pixel dimensions of the label preview: full DPI dimensions scaled down so
/// the longest edge fits `max_edge_px`, never scaled up.
pub fn preview_dimensions(scene: &SceneState, max_edge_px: u32) -> LabelResult<PixelDims> {
    let dpi = Dpi::new(scene.export.dpi)?;
    let full = to_pixel_dimensions(
        scene.label_geometry.width_mm,
        scene.label_geometry.height_mm,
        dpi,
    );
    let max = f64::from(max_edge_px.max(1));
    let scale = (max / f64::from(full.width))
        .min(max / f64::from(full.height))
        .min(1.0);
    Ok(PixelDims {
        width: ((f64::from(full.width) * scale).floor() as u32).max(1),
        height: ((f64::from(full.height) * scale).floor() as u32).max(1),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
