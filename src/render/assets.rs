use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{LabelError, LabelResult};
use crate::render::surface::premultiply_rgba8_in_place;
use crate::scene::model::SceneState;

/// Byte cap for logo uploads.
pub const LOGO_MAX_BYTES: usize = 5 * 1024 * 1024;
/// Byte cap for overlay image uploads.
pub const OVERLAY_MAX_BYTES: usize = 6 * 1024 * 1024;

/// Validate an upload at the boundary, before any decode is attempted.
///
/// Checks the byte cap first, then sniffs the container format; only
/// PNG/JPEG/WEBP pass.
pub fn validate_upload(bytes: &[u8], max_bytes: usize) -> LabelResult<()> {
    if bytes.len() > max_bytes {
        return Err(LabelError::SizeLimitExceeded {
            limit: max_bytes,
            actual: bytes.len(),
        });
    }
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png | image::ImageFormat::Jpeg | image::ImageFormat::WebP) => Ok(()),
        Ok(other) => Err(LabelError::UnsupportedFormat(format!("{other:?}"))),
        Err(_) => Err(LabelError::UnsupportedFormat(
            "unrecognized image container".to_string(),
        )),
    }
}

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> LabelResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| LabelError::image_decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Boolean module matrix produced by the code-matrix generator.
#[derive(Clone, Debug)]
pub struct QrModules {
    /// Module count per side.
    pub size: usize,
    /// Row-major dark flags, `size * size` entries.
    pub dark: Vec<bool>,
}

/// Encode text into a QR module matrix.
pub fn qr_modules(content: &str) -> LabelResult<QrModules> {
    let code = qrcode::QrCode::new(content.as_bytes())
        .map_err(|e| LabelError::render(format!("qr encode: {e}")))?;
    let size = code.width();
    let dark = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();
    Ok(QrModules { size, dark })
}

/// Rasterize a module matrix to an opaque black-on-white bitmap.
///
/// Nearest-module sampling with zero quiet margin; the caller picks the
/// pixel size, so the glyph stays crisp at any output resolution.
pub fn qr_bitmap(modules: &QrModules, size_px: u32) -> LabelResult<PreparedImage> {
    if size_px == 0 {
        return Err(LabelError::validation("qr size_px must be > 0"));
    }
    if modules.size == 0 || modules.dark.len() != modules.size * modules.size {
        return Err(LabelError::render("qr module matrix is malformed"));
    }
    let n = modules.size;
    let px = size_px as usize;
    let mut bytes = vec![0u8; px * px * 4];
    for y in 0..px {
        let my = (y * n) / px;
        for x in 0..px {
            let mx = (x * n) / px;
            let v = if modules.dark[my * n + mx] { 0u8 } else { 255u8 };
            let idx = (y * px + x) * 4;
            bytes[idx] = v;
            bytes[idx + 1] = v;
            bytes[idx + 2] = v;
            bytes[idx + 3] = 255;
        }
    }
    Ok(PreparedImage {
        width: size_px,
        height: size_px,
        rgba8_premul: Arc::new(bytes),
    })
}

/// Font family name → raw font bytes, resolved by the embedding application.
#[derive(Clone, Debug, Default)]
pub struct FontCatalog {
    by_family: HashMap<String, Arc<Vec<u8>>>,
}

impl FontCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register font bytes under a family name.
    pub fn register(&mut self, family: impl Into<String>, bytes: Vec<u8>) {
        self.by_family.insert(family.into(), Arc::new(bytes));
    }

    /// Load every `.ttf`/`.otf` file in `dir`, keyed by file stem.
    pub fn load_dir(&mut self, dir: &Path) {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            if !matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match std::fs::read(&path) {
                Ok(bytes) => self.register(stem.to_string(), bytes),
                Err(e) => tracing::warn!("skipping font '{}': {e}", path.display()),
            }
        }
    }

    /// Font bytes for a family, if registered.
    pub fn get(&self, family: &str) -> Option<Arc<Vec<u8>>> {
        self.by_family.get(family).cloned()
    }
}

/// Everything the compositors need, decoded up front.
///
/// Rendering is IO-free: decode and QR generation happen here, once, before
/// any frame is painted. An element that fails to prepare is recorded as
/// absent and the frame renders without it.
#[derive(Clone, Debug, Default)]
pub struct RenderAssets {
    /// Decoded overlay image, if the scene has one and it decoded.
    pub overlay: Option<PreparedImage>,
    /// Decoded logo image, if the scene has one and it decoded.
    pub logo: Option<PreparedImage>,
    /// QR module matrix, if the scene has non-blank QR content.
    pub qr: Option<QrModules>,
    /// Font bytes per family referenced by the scene.
    pub fonts: HashMap<String, Arc<Vec<u8>>>,
}

impl RenderAssets {
    /// Decode every asset the scene references.
    pub fn prepare(scene: &SceneState, fonts: &FontCatalog) -> Self {
        let mut out = Self::default();

        if let Some(overlay) = &scene.overlay_image {
            match decode_image(&overlay.source_bytes) {
                Ok(img) => out.overlay = Some(img),
                Err(e) => tracing::warn!("overlay image skipped: {e}"),
            }
        }

        if let Some(bytes) = &scene.logo_image {
            match decode_image(bytes) {
                Ok(img) => out.logo = Some(img),
                Err(e) => tracing::warn!("logo image skipped: {e}"),
            }
        }

        if !scene.qr_content.trim().is_empty() {
            match qr_modules(&scene.qr_content) {
                Ok(m) => out.qr = Some(m),
                Err(e) => tracing::warn!("qr glyph skipped: {e}"),
            }
        }

        let mut families: Vec<&str> = vec![scene.font_family.as_str()];
        families.extend(scene.text_layers.iter().map(|l| l.font_family.as_str()));
        for family in families {
            if out.fonts.contains_key(family) {
                continue;
            }
            match fonts.get(family) {
                Some(bytes) => {
                    out.fonts.insert(family.to_string(), bytes);
                }
                None => tracing::warn!("font family '{family}' not in catalog; text skipped"),
            }
        }

        out
    }

    /// Font bytes for a family, if it prepared.
    pub fn font(&self, family: &str) -> Option<&Arc<Vec<u8>>> {
        self.fonts.get(family)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/assets.rs"]
mod tests;
