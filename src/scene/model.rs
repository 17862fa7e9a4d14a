use crate::foundation::core::{Dpi, Rgba8};
use crate::foundation::error::{LabelError, LabelResult};
use crate::shape::registry::{CapStyle, ShapeId};

/// Maximum character length of the product name (UI input bound).
pub const PRODUCT_NAME_MAX_CHARS: usize = 32;
/// Maximum character length of the tagline and of free text layers.
pub const TEXT_MAX_CHARS: usize = 48;

/// Procedural fill pattern painted over the label background.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// No pattern; the background stays flat.
    #[default]
    None,
    /// Diagonal 45° bands.
    Stripes,
    /// Grid of filled circles.
    Dots,
    /// Single sinusoidal stroke across the middle.
    Waves,
}

/// Aspect-preserving placement strategy for the overlay image.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fit entirely inside the destination box.
    #[default]
    Contain,
    /// Fill the destination box, cropping overflow at the clip boundary.
    Cover,
}

/// Coarse font weight classes exposed by the editor.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FontWeightClass {
    /// 400.
    #[default]
    Regular,
    /// 500.
    Medium,
    /// 600.
    SemiBold,
    /// 700.
    Bold,
}

impl FontWeightClass {
    /// Numeric OpenType weight value.
    pub fn value(self) -> f32 {
        match self {
            FontWeightClass::Regular => 400.0,
            FontWeightClass::Medium => 500.0,
            FontWeightClass::SemiBold => 600.0,
            FontWeightClass::Bold => 700.0,
        }
    }
}

/// Unique, immutable identifier of a text layer within a scene.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct LayerId(pub u64);

/// One positioned, rotated, styled line of text on the container body.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextLayer {
    /// Stable identifier, never reused within a scene.
    pub id: LayerId,
    /// Text content (single line).
    pub text: String,
    /// Font family name resolved through the font catalog.
    pub font_family: String,
    /// Glyph size in shape-local units.
    pub size_px: f64,
    /// Weight class.
    pub weight: FontWeightClass,
    /// Fill color.
    pub color: Rgba8,
    /// Horizontal anchor in shape-local units.
    pub x: f64,
    /// Vertical anchor in shape-local units.
    pub y: f64,
    /// Rotation about the anchor, in degrees.
    pub rotation_deg: f64,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f64,
    /// Additional letter spacing in shape-local units.
    pub tracking_px: f64,
}

/// A [`TextLayer`] minus its identifier; input to [`SceneState::add_text_layer`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextLayerDraft {
    /// Text content.
    pub text: String,
    /// Font family name.
    pub font_family: String,
    /// Glyph size in shape-local units.
    pub size_px: f64,
    /// Weight class.
    pub weight: FontWeightClass,
    /// Fill color.
    pub color: Rgba8,
    /// Horizontal anchor.
    pub x: f64,
    /// Vertical anchor.
    pub y: f64,
    /// Rotation about the anchor, in degrees.
    pub rotation_deg: f64,
    /// Layer opacity.
    pub opacity: f64,
    /// Additional letter spacing.
    pub tracking_px: f64,
}

impl Default for TextLayerDraft {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "Inter".to_string(),
            size_px: 24.0,
            weight: FontWeightClass::Regular,
            color: Rgba8::rgb(0x11, 0x11, 0x11),
            x: 140.0,
            y: 260.0,
            rotation_deg: 0.0,
            opacity: 1.0,
            tracking_px: 0.0,
        }
    }
}

/// Physical label size and fine placement offset, all in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LabelGeometry {
    /// Label width.
    pub width_mm: f64,
    /// Label height.
    pub height_mm: f64,
    /// Horizontal offset from the shape's nominal printable rectangle.
    pub offset_x_mm: f64,
    /// Vertical offset from the shape's nominal printable rectangle.
    pub offset_y_mm: f64,
}

impl Default for LabelGeometry {
    fn default() -> Self {
        Self {
            width_mm: 90.0,
            height_mm: 60.0,
            offset_x_mm: 0.0,
            offset_y_mm: 0.0,
        }
    }
}

/// Print export parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportConfig {
    /// Target resolution in dots per inch.
    pub dpi: u32,
    /// Bleed margin beyond the trim line, per side.
    pub bleed_mm: f64,
    /// Whether corner crop marks are drawn.
    pub crop_marks: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            bleed_mm: 0.0,
            crop_marks: true,
        }
    }
}

/// User-supplied raster image composited onto the container body.
///
/// The scene exclusively owns the encoded bytes; renderers decode into their
/// own prepared copies and never retain the source.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayImage {
    /// Encoded PNG/JPEG/WEBP bytes as uploaded.
    pub source_bytes: Vec<u8>,
    /// Placement strategy.
    pub fit: FitMode,
    /// Uniform scale factor applied to the destination box.
    pub scale: f64,
    /// Horizontal placement offset in shape-local units.
    pub offset_x: f64,
    /// Vertical placement offset in shape-local units.
    pub offset_y: f64,
    /// Paint opacity in `[0, 1]`.
    pub opacity: f64,
}

/// The complete, serializable description of one customized container.
///
/// The scene is the single source of truth for rendering: it is created with
/// [`SceneState::default`], replaced wholesale on every edit via
/// [`SceneState::apply`] or the text-layer operations, optionally persisted
/// through [`crate::scene::persist`], and reset by swapping in a fresh
/// default value.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneState {
    /// Active container silhouette.
    pub shape: ShapeId,
    /// Cap variant drawn on the container.
    pub cap: CapStyle,
    /// Product name printed as the label title.
    pub product_name: String,
    /// Secondary line printed under the title.
    pub tagline: String,
    /// Font family for the title and tagline.
    pub font_family: String,
    /// Container body color.
    pub bottle_color: Rgba8,
    /// Cap color.
    pub cap_color: Rgba8,
    /// Label background color (also fills the export bleed).
    pub label_background: Rgba8,
    /// Title/tagline text color.
    pub text_color: Rgba8,
    /// Accent color for the pattern and divider.
    pub accent_color: Rgba8,
    /// Procedural background pattern.
    pub pattern: Pattern,
    /// Physical label geometry.
    pub label_geometry: LabelGeometry,
    /// Export parameters.
    pub export: ExportConfig,
    /// Optional overlay image on the container body.
    pub overlay_image: Option<OverlayImage>,
    /// Optional logo composited bottom-left on the label.
    pub logo_image: Option<Vec<u8>>,
    /// QR payload; empty or whitespace disables the QR glyph.
    pub qr_content: String,
    /// Free text layers on the container body, in paint order.
    pub text_layers: Vec<TextLayer>,
    /// Currently selected text layer, if any.
    pub active_text_layer: Option<LayerId>,
    /// Next value handed out by the layer id allocator.
    #[serde(default)]
    pub next_layer_id: u64,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            shape: ShapeId::Cylinder,
            cap: CapStyle::Flat,
            product_name: "Il mio flacone".to_string(),
            tagline: "Personalizzato in fiera".to_string(),
            font_family: "Inter".to_string(),
            bottle_color: Rgba8::rgb(0xf5, 0xf5, 0xf5),
            cap_color: Rgba8::rgb(0x22, 0x22, 0x22),
            label_background: Rgba8::rgb(0xff, 0xff, 0xff),
            text_color: Rgba8::rgb(0x11, 0x11, 0x11),
            accent_color: Rgba8::rgb(0x5b, 0x9c, 0xf3),
            pattern: Pattern::None,
            label_geometry: LabelGeometry::default(),
            export: ExportConfig::default(),
            overlay_image: None,
            logo_image: None,
            qr_content: String::new(),
            text_layers: Vec::new(),
            active_text_layer: None,
            next_layer_id: 1,
        }
    }
}

/// A partial edit applied to a scene as one total-replacement step.
///
/// `None` fields are left untouched. The two image slots use a nested
/// `Option` so an edit can distinguish "leave alone" from "clear".
#[derive(Clone, Debug, Default)]
pub struct ScenePatch {
    /// New silhouette.
    pub shape: Option<ShapeId>,
    /// New cap variant.
    pub cap: Option<CapStyle>,
    /// New product name.
    pub product_name: Option<String>,
    /// New tagline.
    pub tagline: Option<String>,
    /// New title/tagline font family.
    pub font_family: Option<String>,
    /// New body color.
    pub bottle_color: Option<Rgba8>,
    /// New cap color.
    pub cap_color: Option<Rgba8>,
    /// New label background.
    pub label_background: Option<Rgba8>,
    /// New text color.
    pub text_color: Option<Rgba8>,
    /// New accent color.
    pub accent_color: Option<Rgba8>,
    /// New pattern.
    pub pattern: Option<Pattern>,
    /// New label geometry.
    pub label_geometry: Option<LabelGeometry>,
    /// New export parameters.
    pub export: Option<ExportConfig>,
    /// Replace (`Some(Some(_))`) or clear (`Some(None)`) the overlay image.
    pub overlay_image: Option<Option<OverlayImage>>,
    /// Replace or clear the logo image.
    pub logo_image: Option<Option<Vec<u8>>>,
    /// New QR payload.
    pub qr_content: Option<String>,
}

impl SceneState {
    /// Apply a patch, producing the replacement scene value.
    pub fn apply(&self, patch: ScenePatch) -> SceneState {
        let mut next = self.clone();
        if let Some(v) = patch.shape {
            next.shape = v;
        }
        if let Some(v) = patch.cap {
            next.cap = v;
        }
        if let Some(v) = patch.product_name {
            next.product_name = v;
        }
        if let Some(v) = patch.tagline {
            next.tagline = v;
        }
        if let Some(v) = patch.font_family {
            next.font_family = v;
        }
        if let Some(v) = patch.bottle_color {
            next.bottle_color = v;
        }
        if let Some(v) = patch.cap_color {
            next.cap_color = v;
        }
        if let Some(v) = patch.label_background {
            next.label_background = v;
        }
        if let Some(v) = patch.text_color {
            next.text_color = v;
        }
        if let Some(v) = patch.accent_color {
            next.accent_color = v;
        }
        if let Some(v) = patch.pattern {
            next.pattern = v;
        }
        if let Some(v) = patch.label_geometry {
            next.label_geometry = v;
        }
        if let Some(v) = patch.export {
            next.export = v;
        }
        if let Some(v) = patch.overlay_image {
            next.overlay_image = v;
        }
        if let Some(v) = patch.logo_image {
            next.logo_image = v;
        }
        if let Some(v) = patch.qr_content {
            next.qr_content = v;
        }
        next
    }

    /// Append a new text layer, select it, and return its id.
    pub fn add_text_layer(&self, draft: TextLayerDraft) -> (SceneState, LayerId) {
        let mut next = self.clone();
        let id = LayerId(next.next_layer_id);
        next.next_layer_id += 1;
        next.text_layers.push(TextLayer {
            id,
            text: draft.text,
            font_family: draft.font_family,
            size_px: draft.size_px,
            weight: draft.weight,
            color: draft.color,
            x: draft.x,
            y: draft.y,
            rotation_deg: draft.rotation_deg,
            opacity: draft.opacity,
            tracking_px: draft.tracking_px,
        });
        next.active_text_layer = Some(id);
        (next, id)
    }

    /// Remove the layer with the given id, if present.
    ///
    /// Exactly one entry is deleted; the active selection moves to the first
    /// remaining layer, or to none. Other layers are untouched.
    pub fn remove_text_layer(&self, id: LayerId) -> SceneState {
        let mut next = self.clone();
        if let Some(pos) = next.text_layers.iter().position(|l| l.id == id) {
            next.text_layers.remove(pos);
            next.active_text_layer = next.text_layers.first().map(|l| l.id);
        }
        next
    }

    /// Replace the fields of an existing layer, keeping its id and position.
    pub fn patch_text_layer(&self, id: LayerId, draft: TextLayerDraft) -> LabelResult<SceneState> {
        let mut next = self.clone();
        let layer = next
            .text_layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| LabelError::validation(format!("no text layer with id {}", id.0)))?;
        layer.text = draft.text;
        layer.font_family = draft.font_family;
        layer.size_px = draft.size_px;
        layer.weight = draft.weight;
        layer.color = draft.color;
        layer.x = draft.x;
        layer.y = draft.y;
        layer.rotation_deg = draft.rotation_deg;
        layer.opacity = draft.opacity;
        layer.tracking_px = draft.tracking_px;
        Ok(next)
    }

    /// Select a layer (or none); the id must exist in the scene.
    pub fn select_text_layer(&self, id: Option<LayerId>) -> LabelResult<SceneState> {
        if let Some(id) = id
            && !self.text_layers.iter().any(|l| l.id == id)
        {
            return Err(LabelError::validation(format!(
                "no text layer with id {}",
                id.0
            )));
        }
        let mut next = self.clone();
        next.active_text_layer = id;
        Ok(next)
    }

    /// Validate scene invariants before rendering or persisting.
    pub fn validate(&self) -> LabelResult<()> {
        Dpi::new(self.export.dpi)?;

        if self.product_name.chars().count() > PRODUCT_NAME_MAX_CHARS {
            return Err(LabelError::validation(format!(
                "product_name exceeds {PRODUCT_NAME_MAX_CHARS} characters"
            )));
        }
        if self.tagline.chars().count() > TEXT_MAX_CHARS {
            return Err(LabelError::validation(format!(
                "tagline exceeds {TEXT_MAX_CHARS} characters"
            )));
        }

        let g = &self.label_geometry;
        for (name, v) in [("width_mm", g.width_mm), ("height_mm", g.height_mm)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(LabelError::validation(format!(
                    "label_geometry.{name} must be finite and > 0"
                )));
            }
        }
        for (name, v) in [("offset_x_mm", g.offset_x_mm), ("offset_y_mm", g.offset_y_mm)] {
            if !v.is_finite() {
                return Err(LabelError::validation(format!(
                    "label_geometry.{name} must be finite"
                )));
            }
        }

        if !self.export.bleed_mm.is_finite() || self.export.bleed_mm < 0.0 {
            return Err(LabelError::validation("bleed_mm must be finite and >= 0"));
        }

        if let Some(overlay) = &self.overlay_image {
            if overlay.source_bytes.is_empty() {
                return Err(LabelError::validation("overlay source_bytes is empty"));
            }
            if !overlay.scale.is_finite() || !(0.1..=6.0).contains(&overlay.scale) {
                return Err(LabelError::validation(
                    "overlay scale must be in [0.1, 6.0]",
                ));
            }
            if !overlay.offset_x.is_finite() || !overlay.offset_y.is_finite() {
                return Err(LabelError::validation("overlay offsets must be finite"));
            }
            validate_opacity(overlay.opacity, "overlay opacity")?;
        }

        let mut seen = std::collections::HashSet::new();
        for layer in &self.text_layers {
            if !seen.insert(layer.id) {
                return Err(LabelError::validation(format!(
                    "duplicate text layer id {}",
                    layer.id.0
                )));
            }
            if layer.text.chars().count() > TEXT_MAX_CHARS {
                return Err(LabelError::validation(format!(
                    "text layer {} exceeds {TEXT_MAX_CHARS} characters",
                    layer.id.0
                )));
            }
            if !layer.size_px.is_finite() || layer.size_px <= 0.0 {
                return Err(LabelError::validation(format!(
                    "text layer {} size_px must be finite and > 0",
                    layer.id.0
                )));
            }
            for (name, v) in [
                ("x", layer.x),
                ("y", layer.y),
                ("rotation_deg", layer.rotation_deg),
                ("tracking_px", layer.tracking_px),
            ] {
                if !v.is_finite() {
                    return Err(LabelError::validation(format!(
                        "text layer {} {name} must be finite",
                        layer.id.0
                    )));
                }
            }
            validate_opacity(layer.opacity, "text layer opacity")?;
        }

        if let Some(active) = self.active_text_layer
            && !self.text_layers.iter().any(|l| l.id == active)
        {
            return Err(LabelError::validation(
                "active_text_layer references a missing layer",
            ));
        }

        // Ids are never reused within a scene; the allocator must sit past
        // every id already handed out.
        if let Some(max_id) = self.text_layers.iter().map(|l| l.id.0).max()
            && self.next_layer_id <= max_id
        {
            return Err(LabelError::validation(
                "next_layer_id must exceed every existing layer id",
            ));
        }

        Ok(())
    }
}

fn validate_opacity(v: f64, field: &str) -> LabelResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(LabelError::validation(format!(
            "{field} must be in [0, 1]"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
