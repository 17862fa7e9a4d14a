use crate::foundation::error::{LabelError, LabelResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Millimetres per inch, the basis of every DPI conversion.
pub const MM_PER_INCH: f64 = 25.4;

/// Lowest DPI accepted for export.
pub const MIN_DPI: u32 = 72;
/// Highest DPI accepted for export.
pub const MAX_DPI: u32 = 1200;

/// Validated dots-per-inch value.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Dpi(u32);

impl Dpi {
    /// Construct a [`Dpi`], rejecting values outside `[MIN_DPI, MAX_DPI]`.
    pub fn new(value: u32) -> LabelResult<Self> {
        if !(MIN_DPI..=MAX_DPI).contains(&value) {
            return Err(LabelError::validation(format!(
                "dpi must be in [{MIN_DPI}, {MAX_DPI}], got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Raw DPI value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// DPI as a float for unit math.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

/// Device pixels per millimetre at the given DPI.
pub fn pixels_per_mm(dpi: Dpi) -> f64 {
    dpi.as_f64() / MM_PER_INCH
}

/// Integer pixel dimensions of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelDims {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

/// Convert physical label dimensions to device pixels at the target DPI.
///
/// Each axis is floored and clamped to at least one pixel. Pure; invalid DPI
/// values are rejected upstream by [`Dpi::new`].
pub fn to_pixel_dimensions(width_mm: f64, height_mm: f64, dpi: Dpi) -> PixelDims {
    let ppm = pixels_per_mm(dpi);
    PixelDims {
        width: ((width_mm * ppm).floor() as u32).max(1),
        height: ((height_mm * ppm).floor() as u32).max(1),
    }
}

/// Straight-alpha sRGB color, serialized as `#rrggbb` / `#rrggbbaa` hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (straight).
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` hex notation.
    pub fn from_hex(hex: &str) -> LabelResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let err = || LabelError::validation(format!("invalid hex color '{hex}'"));
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
        match digits.len() {
            3 => {
                let nib = |s: &str| byte(s).map(|v| v * 17);
                Ok(Self {
                    r: nib(&digits[0..1])?,
                    g: nib(&digits[1..2])?,
                    b: nib(&digits[2..3])?,
                    a: 255,
                })
            }
            6 => Ok(Self {
                r: byte(&digits[0..2])?,
                g: byte(&digits[2..4])?,
                b: byte(&digits[4..6])?,
                a: 255,
            }),
            8 => Ok(Self {
                r: byte(&digits[0..2])?,
                g: byte(&digits[2..4])?,
                b: byte(&digits[4..6])?,
                a: byte(&digits[6..8])?,
            }),
            _ => Err(err()),
        }
    }

    /// Format as lowercase hex, omitting the alpha byte when fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Convert to premultiplied form.
    pub fn premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    /// Apply an extra opacity factor in `[0, 1]` to the alpha channel.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8Premul {
    /// Premultiplied red channel.
    pub r: u8,
    /// Premultiplied green channel.
    pub g: u8,
    /// Premultiplied blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply a straight-alpha color.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channel bytes in memory order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
