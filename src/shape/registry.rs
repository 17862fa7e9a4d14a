use std::sync::OnceLock;

use crate::foundation::core::{BezPath, Point, Rect, Size};
use crate::foundation::error::{LabelError, LabelResult};

/// Identifier of a container silhouette in the fixed catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeId {
    /// Tall cylindrical bottle.
    Cylinder,
    /// Square-shouldered bottle.
    Square,
    /// Round-bellied bottle.
    Rounded,
}

impl ShapeId {
    /// Every catalog entry, in UI order.
    pub const ALL: [ShapeId; 3] = [ShapeId::Cylinder, ShapeId::Square, ShapeId::Rounded];

    /// Stable lowercase name used in serialized scenes.
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeId::Cylinder => "cylinder",
            ShapeId::Square => "square",
            ShapeId::Rounded => "rounded",
        }
    }
}

impl std::str::FromStr for ShapeId {
    type Err = LabelError;

    fn from_str(s: &str) -> LabelResult<Self> {
        match s {
            "cylinder" => Ok(ShapeId::Cylinder),
            "square" => Ok(ShapeId::Square),
            "rounded" => Ok(ShapeId::Rounded),
            other => Err(LabelError::UnknownShape(other.to_string())),
        }
    }
}

/// Cap variant drawn at the shape's cap anchor.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CapStyle {
    /// Plain flat screw cap.
    #[default]
    Flat,
    /// Pump dispenser with nozzle arm.
    Pump,
    /// Flip-top lid.
    Flip,
}

/// Immutable silhouette entry in the shape registry.
///
/// `outline` is a single closed path used both as the body fill and as the
/// clip boundary for overlay imagery and text layers. `printable_rect` is the
/// nominal label area in shape-local units, and `units_per_mm` is the one
/// linear constant mapping physical label millimetres into that coordinate
/// space.
#[derive(Clone, Debug)]
pub struct ShapeDefinition {
    /// Which catalog entry this is.
    pub id: ShapeId,
    /// Local coordinate space of the silhouette.
    pub view_box: Size,
    /// Closed outline path (fill and clip boundary).
    pub outline: BezPath,
    /// Nominal printable label rectangle in local units.
    pub printable_rect: Rect,
    /// Horizontal center / top of the neck where the cap is drawn.
    pub cap_anchor: Point,
    /// Linear scale from millimetres to local units.
    pub units_per_mm: f64,
}

impl ShapeDefinition {
    /// Whether a shape-local point lies inside the silhouette.
    ///
    /// Nonzero-winding containment on the outline path; used for hit-testing
    /// and for asserting that clipped content stays inside the body.
    pub fn contains_local(&self, pt: Point) -> bool {
        use kurbo::Shape as _;
        self.outline.contains(pt)
    }
}

const CYLINDER_OUTLINE_D: &str = "M90 50 h100 v35 c0 10 -10 18 -22 22 v20 c0 10 6 18 6 28 v260 c0 60 -34 92 -84 92s-84 -32 -84 -92V155c0-10 6-18 6-28v-20c-12-4-22-12-22-22V50h100z";
const SQUARE_OUTLINE_D: &str = "M80 60 h140 v40 c0 12 -10 20 -20 22 v18 c0 10 6 20 6 34 v250 c0 70 -46 100 -106 100s-106 -30 -106 -100V174c0-14 6-24 6-34v-18c-10-2-20-10-20-22V60h140z";
const ROUNDED_OUTLINE_D: &str = "M95 60 h90 v30 c0 12 -10 20 -22 24 v18 c0 10 8 22 8 38 v240 c0 80 -38 110 -88 110s-88 -30 -88 -110V170c0-16 8-28 8-38v-18c-12-4-22-12-22-24V60h104z";

const UNITS_PER_MM: f64 = 2.0;

static CATALOG: OnceLock<Result<Vec<ShapeDefinition>, String>> = OnceLock::new();

fn build_catalog() -> Result<Vec<ShapeDefinition>, String> {
    let parse = |id: ShapeId, d: &str| -> Result<BezPath, String> {
        BezPath::from_svg(d).map_err(|e| format!("shape '{}' outline: {e}", id.as_str()))
    };

    Ok(vec![
        ShapeDefinition {
            id: ShapeId::Cylinder,
            view_box: Size::new(280.0, 520.0),
            outline: parse(ShapeId::Cylinder, CYLINDER_OUTLINE_D)?,
            printable_rect: Rect::new(50.0, 230.0, 230.0, 350.0),
            cap_anchor: Point::new(140.0, 0.0),
            units_per_mm: UNITS_PER_MM,
        },
        ShapeDefinition {
            id: ShapeId::Square,
            view_box: Size::new(300.0, 520.0),
            outline: parse(ShapeId::Square, SQUARE_OUTLINE_D)?,
            printable_rect: Rect::new(40.0, 220.0, 260.0, 360.0),
            cap_anchor: Point::new(150.0, 0.0),
            units_per_mm: UNITS_PER_MM,
        },
        ShapeDefinition {
            id: ShapeId::Rounded,
            view_box: Size::new(280.0, 520.0),
            outline: parse(ShapeId::Rounded, ROUNDED_OUTLINE_D)?,
            printable_rect: Rect::new(40.0, 240.0, 240.0, 370.0),
            cap_anchor: Point::new(140.0, 0.0),
            units_per_mm: UNITS_PER_MM,
        },
    ])
}

/// Look up the definition for a catalog entry.
///
/// Total over [`ShapeId`]; the only failure mode is corrupt built-in path
/// data, which is surfaced as a render error instead of a panic.
pub fn lookup(id: ShapeId) -> LabelResult<&'static ShapeDefinition> {
    match CATALOG.get_or_init(build_catalog) {
        Ok(entries) => entries
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| LabelError::UnknownShape(id.as_str().to_string())),
        Err(msg) => Err(LabelError::render(msg.clone())),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shape/registry.rs"]
mod tests;
