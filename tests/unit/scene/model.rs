use super::*;

#[test]
fn default_scene_validates() {
    let scene = SceneState::default();
    scene.validate().unwrap();
    assert_eq!(scene.product_name, "Il mio flacone");
    assert_eq!(scene.label_geometry.width_mm, 90.0);
    assert_eq!(scene.label_geometry.height_mm, 60.0);
    assert_eq!(scene.export.dpi, 300);
    assert!(scene.export.crop_marks);
    assert_eq!(scene.pattern, Pattern::None);
    assert!(scene.text_layers.is_empty());
    assert!(scene.active_text_layer.is_none());
}

#[test]
fn apply_patch_replaces_only_named_fields() {
    let scene = SceneState::default();
    let next = scene.apply(ScenePatch {
        pattern: Some(Pattern::Dots),
        tagline: Some("Nuova tagline".to_string()),
        ..ScenePatch::default()
    });

    assert_eq!(next.pattern, Pattern::Dots);
    assert_eq!(next.tagline, "Nuova tagline");
    // Untouched fields carry over.
    assert_eq!(next.product_name, scene.product_name);
    assert_eq!(next.bottle_color, scene.bottle_color);
    // The original value is unaffected.
    assert_eq!(scene.pattern, Pattern::None);
}

#[test]
fn patch_can_clear_image_slots() {
    let scene = SceneState::default().apply(ScenePatch {
        logo_image: Some(Some(vec![1, 2, 3])),
        ..ScenePatch::default()
    });
    assert!(scene.logo_image.is_some());

    let cleared = scene.apply(ScenePatch {
        logo_image: Some(None),
        ..ScenePatch::default()
    });
    assert!(cleared.logo_image.is_none());
}

#[test]
fn add_then_remove_layer_restores_selection_and_length() {
    let scene = SceneState::default();
    let (scene, a) = scene.add_text_layer(TextLayerDraft {
        text: "Lotto 42".to_string(),
        ..TextLayerDraft::default()
    });
    let before_len = scene.text_layers.len();
    let (scene, b) = scene.add_text_layer(TextLayerDraft::default());

    assert_ne!(a, b);
    assert_eq!(scene.active_text_layer, Some(b));
    assert_eq!(scene.text_layers.len(), before_len + 1);

    let other_before = scene.text_layers[0].clone();
    let scene = scene.remove_text_layer(b);
    assert_eq!(scene.text_layers.len(), before_len);
    assert_eq!(scene.active_text_layer, Some(a));
    assert_eq!(scene.text_layers[0], other_before);

    let scene = scene.remove_text_layer(a);
    assert!(scene.text_layers.is_empty());
    assert_eq!(scene.active_text_layer, None);
}

#[test]
fn layer_ids_are_never_reused() {
    let scene = SceneState::default();
    let (scene, a) = scene.add_text_layer(TextLayerDraft::default());
    let scene = scene.remove_text_layer(a);
    let (_, b) = scene.add_text_layer(TextLayerDraft::default());
    assert_ne!(a, b);
}

#[test]
fn removing_unknown_layer_is_a_no_op() {
    let scene = SceneState::default();
    let (scene, _) = scene.add_text_layer(TextLayerDraft::default());
    let next = scene.remove_text_layer(LayerId(999));
    assert_eq!(next.text_layers.len(), scene.text_layers.len());
    assert_eq!(next.active_text_layer, scene.active_text_layer);
}

#[test]
fn patch_text_layer_requires_existing_id() {
    let scene = SceneState::default();
    let (scene, id) = scene.add_text_layer(TextLayerDraft::default());

    let next = scene
        .patch_text_layer(
            id,
            TextLayerDraft {
                text: "Aggiornato".to_string(),
                rotation_deg: 15.0,
                ..TextLayerDraft::default()
            },
        )
        .unwrap();
    assert_eq!(next.text_layers[0].text, "Aggiornato");
    assert_eq!(next.text_layers[0].id, id);

    assert!(scene
        .patch_text_layer(LayerId(12345), TextLayerDraft::default())
        .is_err());
}

#[test]
fn select_text_layer_checks_membership() {
    let scene = SceneState::default();
    let (scene, id) = scene.add_text_layer(TextLayerDraft::default());
    let scene = scene.select_text_layer(None).unwrap();
    assert_eq!(scene.active_text_layer, None);
    let scene = scene.select_text_layer(Some(id)).unwrap();
    assert_eq!(scene.active_text_layer, Some(id));
    assert!(scene.select_text_layer(Some(LayerId(777))).is_err());
}

#[test]
fn validate_rejects_bad_values() {
    let mut scene = SceneState::default();
    scene.export.dpi = 50;
    assert!(scene.validate().is_err());

    let mut scene = SceneState::default();
    scene.label_geometry.width_mm = 0.0;
    assert!(scene.validate().is_err());

    let mut scene = SceneState::default();
    scene.label_geometry.offset_x_mm = f64::NAN;
    assert!(scene.validate().is_err());

    let mut scene = SceneState::default();
    scene.export.bleed_mm = -1.0;
    assert!(scene.validate().is_err());

    let mut scene = SceneState::default();
    scene.product_name = "x".repeat(PRODUCT_NAME_MAX_CHARS + 1);
    assert!(scene.validate().is_err());
}

#[test]
fn validate_rejects_bad_overlay_and_layers() {
    let mut scene = SceneState::default();
    scene.overlay_image = Some(OverlayImage {
        source_bytes: vec![1],
        fit: FitMode::Cover,
        scale: 7.0,
        offset_x: 0.0,
        offset_y: 0.0,
        opacity: 1.0,
    });
    assert!(scene.validate().is_err());

    let (mut scene, id) = SceneState::default().add_text_layer(TextLayerDraft {
        opacity: 1.5,
        ..TextLayerDraft::default()
    });
    assert!(scene.validate().is_err());

    scene.text_layers[0].opacity = 1.0;
    scene.validate().unwrap();

    // Duplicate ids are a structural error.
    let dup = scene.text_layers[0].clone();
    scene.text_layers.push(dup);
    assert!(scene.validate().is_err());

    // Dangling active selection is a structural error.
    let mut scene = SceneState::default();
    scene.active_text_layer = Some(id);
    assert!(scene.validate().is_err());
}

#[test]
fn scene_json_roundtrips() {
    let (scene, _) = SceneState::default().add_text_layer(TextLayerDraft {
        text: "Retro".to_string(),
        rotation_deg: -8.0,
        ..TextLayerDraft::default()
    });
    let json = serde_json::to_string(&scene).unwrap();
    let back: SceneState = serde_json::from_str(&json).unwrap();
    assert_eq!(back.text_layers, scene.text_layers);
    assert_eq!(back.active_text_layer, scene.active_text_layer);
    assert_eq!(back.next_layer_id, scene.next_layer_id);
    assert_eq!(back.accent_color, scene.accent_color);
}

#[test]
fn weight_classes_map_to_opentype_values() {
    assert_eq!(FontWeightClass::Regular.value(), 400.0);
    assert_eq!(FontWeightClass::Medium.value(), 500.0);
    assert_eq!(FontWeightClass::SemiBold.value(), 600.0);
    assert_eq!(FontWeightClass::Bold.value(), 700.0);
}
