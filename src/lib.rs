//! labelkit renders customizable product mockups and print-ready labels.
//!
//! The pipeline is a pure scene-to-pixels transformation:
//!
//! 1. **Describe**: build or patch a [`SceneState`] (shape, colors, pattern,
//!    text layers, overlay image, label geometry, export settings)
//! 2. **Prepare**: decode every referenced asset once via [`RenderAssets`]
//! 3. **Render**: paint a live preview or full mockup with
//!    [`SceneCompositor`]
//! 4. **Export**: produce a print-resolution PNG with bleed and crop marks
//!    via [`Exporter`]
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: identical scene and assets always produce identical
//!   pixels; there is no randomness in the render path.
//! - **No IO in renderers**: decoding and QR generation are front-loaded in
//!   [`RenderAssets::prepare`], so a compositor never awaits or observes a
//!   partially loaded image.
//! - **Premultiplied RGBA8** end-to-end; PNG output converts to straight
//!   alpha at the encode boundary.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod export;
mod foundation;
mod render;
mod scene;
mod shape;

/// Scene persistence (whole-state JSON blob, read-with-fallback).
pub mod persist {
    pub use crate::scene::persist::{STORAGE_FILE, load, reset, save, try_load};
}

pub use foundation::core::{
    Affine, BezPath, Dpi, MAX_DPI, MIN_DPI, MM_PER_INCH, PixelDims, Point, Rect, Rgba8,
    Rgba8Premul, Size, Vec2, pixels_per_mm, to_pixel_dimensions,
};
pub use foundation::error::{LabelError, LabelResult};

pub use scene::model::{
    ExportConfig, FitMode, FontWeightClass, LabelGeometry, LayerId, OverlayImage, Pattern,
    PRODUCT_NAME_MAX_CHARS, ScenePatch, SceneState, TEXT_MAX_CHARS, TextLayer, TextLayerDraft,
};

pub use shape::registry::{CapStyle, ShapeDefinition, ShapeId, lookup};

pub use render::assets::{
    FontCatalog, LOGO_MAX_BYTES, OVERLAY_MAX_BYTES, PreparedImage, QrModules, RenderAssets,
    decode_image, qr_bitmap, qr_modules, validate_upload,
};
pub use render::compositor::{SceneCompositor, preview_dimensions};
pub use render::overlay::{fit_contain, fit_cover, placement};
pub use render::pattern::paint as paint_pattern;
pub use render::surface::{Surface, blit_over, composite_over};
pub use render::text::{
    ELLIPSIS, LayoutMeasurer, TextBrush, TextLayoutEngine, TextMeasurer, TextStyle,
    truncate_to_width,
};

pub use export::png::{ExportArtifact, ExportState, Exporter, export_file_name};
