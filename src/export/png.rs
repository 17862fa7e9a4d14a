use std::io::Cursor;

use crate::foundation::core::{Dpi, Rgba8Premul, pixels_per_mm, to_pixel_dimensions};
use crate::foundation::error::{LabelError, LabelResult};
use crate::render::assets::RenderAssets;
use crate::render::compositor::SceneCompositor;
use crate::render::surface::{Surface, blit_over, fill_rect_px};
use crate::scene::model::SceneState;

/// Length of each crop-mark segment in pixels.
const CROP_MARK_LEN: i64 = 18;
/// Gap between a crop mark and the trim corner, in pixels.
const CROP_MARK_GAP: i64 = 2;

/// Observable state of the export pipeline.
///
/// `Idle -> Rendering -> {Ready | Failed} -> Idle`. Exports run to
/// completion within [`Exporter::export`], so `Rendering` is only observable
/// from the state history; the terminal state is held until the next export
/// or an explicit [`Exporter::acknowledge`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportState {
    /// No export in flight.
    #[default]
    Idle,
    /// An export is running.
    Rendering,
    /// The last export produced an artifact.
    Ready,
    /// The last export failed.
    Failed,
}

/// A finished print-ready export.
#[derive(Clone, Debug)]
pub struct ExportArtifact {
    /// Synthesized download file name.
    pub file_name: String,
    /// Full surface width including bleed, in pixels.
    pub width: u32,
    /// Full surface height including bleed, in pixels.
    pub height: u32,
    /// PNG-encoded image bytes.
    pub png: Vec<u8>,
}

/// Print export pipeline wrapping a [`SceneCompositor`].
///
/// Each invocation is independent and side-effect-free on the scene; the
/// export surface is distinct from any preview surface, so exports never
/// block preview rendering.
pub struct Exporter {
    compositor: SceneCompositor,
    state: ExportState,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    /// Construct an idle exporter.
    pub fn new() -> Self {
        Self {
            compositor: SceneCompositor::new(),
            state: ExportState::Idle,
        }
    }

    /// Current pipeline state.
    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Return a terminal `Ready`/`Failed` state to `Idle`.
    pub fn acknowledge(&mut self) {
        self.state = ExportState::Idle;
    }

    /// Render the scene at full export resolution and encode it as PNG.
    ///
    /// The surface is padded by the bleed margin on every side and filled
    /// with the label background first, so bleed is colored rather than
    /// blank; crop marks, when enabled, are eight short segments just
    /// outside the trim box.
    pub fn export(
        &mut self,
        scene: &SceneState,
        assets: &RenderAssets,
    ) -> LabelResult<ExportArtifact> {
        self.state = ExportState::Rendering;
        match self.run(scene, assets) {
            Ok(artifact) => {
                self.state = ExportState::Ready;
                Ok(artifact)
            }
            Err(e) => {
                self.state = ExportState::Failed;
                Err(e)
            }
        }
    }

    fn run(&mut self, scene: &SceneState, assets: &RenderAssets) -> LabelResult<ExportArtifact> {
        scene.validate()?;
        let dpi = Dpi::new(scene.export.dpi)?;
        let g = &scene.label_geometry;
        let dims = to_pixel_dimensions(g.width_mm, g.height_mm, dpi);
        let bleed_px = (scene.export.bleed_mm * pixels_per_mm(dpi)).floor() as u32;
        let full_w = dims.width + bleed_px * 2;
        let full_h = dims.height + bleed_px * 2;
        tracing::debug!(
            width = full_w,
            height = full_h,
            bleed_px,
            dpi = dpi.get(),
            "exporting label"
        );

        let mut out = Surface::new(full_w, full_h)?;
        out.clear(scene.label_background.premul());

        let label = self
            .compositor
            .render_label(scene, assets, dims.width, dims.height)?;
        blit_over(&mut out, &label, bleed_px, bleed_px)?;

        if scene.export.crop_marks {
            draw_crop_marks(
                &mut out,
                i64::from(bleed_px),
                i64::from(dims.width),
                i64::from(dims.height),
            );
        }

        let png = encode_png(&out)?;
        Ok(ExportArtifact {
            file_name: export_file_name(
                &scene.product_name,
                g.width_mm,
                g.height_mm,
                dpi.get(),
                scene.export.bleed_mm,
            ),
            width: full_w,
            height: full_h,
            png,
        })
    }
}

/// Draw the eight corner crop marks (two per corner, one horizontal and one
/// vertical), offset outward from the trim box. Segments falling outside the
/// surface (zero bleed) clip away.
fn draw_crop_marks(out: &mut Surface, m: i64, w: i64, h: i64) {
    let ink = Rgba8Premul::from_straight_rgba(0, 0, 0, 255);
    let len = CROP_MARK_LEN - CROP_MARK_GAP;

    // Top-left.
    fill_rect_px(out, m - CROP_MARK_LEN, m, len, 1, ink);
    fill_rect_px(out, m, m - CROP_MARK_LEN, 1, len, ink);
    // Top-right.
    fill_rect_px(out, m + w + CROP_MARK_GAP, m, len, 1, ink);
    fill_rect_px(out, m + w, m - CROP_MARK_LEN, 1, len, ink);
    // Bottom-left.
    fill_rect_px(out, m - CROP_MARK_LEN, m + h, len, 1, ink);
    fill_rect_px(out, m, m + h + CROP_MARK_GAP, 1, len, ink);
    // Bottom-right.
    fill_rect_px(out, m + w + CROP_MARK_GAP, m + h, len, 1, ink);
    fill_rect_px(out, m + w, m + h + CROP_MARK_GAP, 1, len, ink);
}

fn encode_png(surface: &Surface) -> LabelResult<Vec<u8>> {
    let straight = surface.to_straight_rgba();
    let img = image::RgbaImage::from_raw(surface.width(), surface.height(), straight)
        .ok_or_else(|| LabelError::render("pixel buffer size mismatch during encode"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| LabelError::render(format!("png encode: {e}")))?;
    Ok(buf)
}

/// Synthesize the export file name from the product name and print settings.
///
/// Pattern: `etichetta-<slug>-<W>x<H>mm-<DPI>dpi[-bleed<B>mm].png`.
pub fn export_file_name(
    product_name: &str,
    width_mm: f64,
    height_mm: f64,
    dpi: u32,
    bleed_mm: f64,
) -> String {
    let slug = slugify(product_name);
    let slug = if slug.is_empty() { "flacone" } else { &slug };
    let bleed = if bleed_mm > 0.0 {
        format!("-bleed{}mm", fmt_mm(bleed_mm))
    } else {
        String::new()
    };
    format!(
        "etichetta-{slug}-{}x{}mm-{dpi}dpi{bleed}.png",
        fmt_mm(width_mm),
        fmt_mm(height_mm)
    )
}

/// Lowercase the name and collapse every non-alphanumeric run into a single
/// hyphen, trimming leading/trailing hyphens.
fn slugify(name: &str) -> String {
    let mut out = String::new();
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

fn fmt_mm(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
