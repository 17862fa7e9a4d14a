use super::*;

#[test]
fn every_catalog_entry_resolves() {
    for id in ShapeId::ALL {
        let def = lookup(id).unwrap();
        assert_eq!(def.id, id);
        assert!(!def.outline.elements().is_empty());
        assert!(def.units_per_mm > 0.0);
    }
}

#[test]
fn printable_rect_sits_inside_view_box() {
    for id in ShapeId::ALL {
        let def = lookup(id).unwrap();
        let r = def.printable_rect;
        assert!(r.x0 >= 0.0 && r.y0 >= 0.0);
        assert!(r.x1 <= def.view_box.width);
        assert!(r.y1 <= def.view_box.height);
        assert!(r.width() > 0.0 && r.height() > 0.0);
    }
}

#[test]
fn outline_is_a_closed_fillable_region() {
    use kurbo::Shape as _;

    for id in ShapeId::ALL {
        let def = lookup(id).unwrap();
        // A closed silhouette encloses area and contains the center of its
        // printable rectangle.
        assert!(def.outline.area().abs() > 0.0);
        assert!(def.outline.contains(def.printable_rect.center()));
    }
}

#[test]
fn default_label_fills_cylinder_printable_rect() {
    // 90x60 mm at 2 units/mm is exactly the cylinder's 180x120 printable
    // area; the linear mapping has no residual fudge factor.
    let def = lookup(ShapeId::Cylinder).unwrap();
    assert_eq!(90.0 * def.units_per_mm, def.printable_rect.width());
    assert_eq!(60.0 * def.units_per_mm, def.printable_rect.height());
}

#[test]
fn shape_names_roundtrip() {
    for id in ShapeId::ALL {
        let parsed: ShapeId = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);
    }
}

#[test]
fn unknown_shape_name_is_rejected() {
    let err = "hexagon".parse::<ShapeId>().unwrap_err();
    assert!(matches!(err, LabelError::UnknownShape(name) if name == "hexagon"));
}

#[test]
fn shape_id_serde_uses_lowercase_tags() {
    assert_eq!(
        serde_json::to_string(&ShapeId::Cylinder).unwrap(),
        "\"cylinder\""
    );
    let back: ShapeId = serde_json::from_str("\"rounded\"").unwrap();
    assert_eq!(back, ShapeId::Rounded);
    assert!(serde_json::from_str::<ShapeId>("\"hexagon\"").is_err());
}
