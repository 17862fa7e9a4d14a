use crate::foundation::error::{LabelError, LabelResult};

/// Glyph appended to a truncated string.
pub const ELLIPSIS: char = '\u{2026}';

/// Measures the advance width of a single line of text, in pixels.
///
/// The compositor's measurer is a shaped parley layout; tests substitute a
/// deterministic fake.
pub trait TextMeasurer {
    /// Advance width of `text` under the measurer's current style.
    fn measure(&mut self, text: &str) -> f64;
}

/// Shorten `text` so it fits in `max_width_px`, appending an ellipsis.
///
/// A string that already fits is returned unchanged. Otherwise the last
/// character is removed and the ellipsis-suffixed candidate re-measured until
/// it fits or no characters remain. Quadratic under a naive measurer, which
/// is fine at UI-bounded input lengths.
pub fn truncate_to_width(
    text: &str,
    max_width_px: f64,
    measurer: &mut impl TextMeasurer,
) -> String {
    if measurer.measure(text) <= max_width_px {
        return text.to_string();
    }

    let mut kept: Vec<char> = text.chars().collect();
    while !kept.is_empty() {
        kept.pop();
        let mut candidate: String = kept.iter().collect();
        candidate.push(ELLIPSIS);
        if measurer.measure(&candidate) <= max_width_px {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// RGBA8 brush color carried through parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Style inputs for one shaped line.
#[derive(Clone, Copy, Debug)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size_px: f32,
    /// Numeric OpenType weight (400, 500, 700, ...).
    pub weight: f32,
    /// Extra letter spacing in pixels.
    pub tracking_px: f32,
    /// Fill brush.
    pub brush: TextBrush,
}

/// Stateful helper building parley layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape and lay out a single line using the provided font bytes.
    pub fn layout_line(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        style: TextStyle,
    ) -> LabelResult<parley::Layout<TextBrush>> {
        if !style.size_px.is_finite() || style.size_px <= 0.0 {
            return Err(LabelError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            LabelError::validation("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| LabelError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(style.weight),
        ));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(
            style.tracking_px,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(style.brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Advance width of `text` under the given font and style.
    pub fn measure_line(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        style: TextStyle,
    ) -> LabelResult<f64> {
        let layout = self.layout_line(text, font_bytes, style)?;
        Ok(f64::from(layout.full_width()))
    }
}

/// [`TextMeasurer`] backed by a [`TextLayoutEngine`] with a fixed style.
pub struct LayoutMeasurer<'a> {
    engine: &'a mut TextLayoutEngine,
    font_bytes: &'a [u8],
    style: TextStyle,
}

impl<'a> LayoutMeasurer<'a> {
    /// Bind an engine, font bytes and style into a measurer.
    pub fn new(engine: &'a mut TextLayoutEngine, font_bytes: &'a [u8], style: TextStyle) -> Self {
        Self {
            engine,
            font_bytes,
            style,
        }
    }
}

impl TextMeasurer for LayoutMeasurer<'_> {
    fn measure(&mut self, text: &str) -> f64 {
        // A font that shapes at all shapes every candidate; treat failure as
        // zero width so the text still paints rather than vanishing.
        self.engine
            .measure_line(text, self.font_bytes, self.style)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
