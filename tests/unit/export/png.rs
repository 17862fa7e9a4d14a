use super::*;
use crate::render::assets::{FontCatalog, RenderAssets};

#[test]
fn slug_collapses_punctuation_runs() {
    assert_eq!(
        export_file_name("Il mio flacone!", 90.0, 60.0, 300, 0.0),
        "etichetta-il-mio-flacone-90x60mm-300dpi.png"
    );
    assert_eq!(
        export_file_name("  Shampoo -- Bio  ", 90.0, 60.0, 300, 0.0),
        "etichetta-shampoo-bio-90x60mm-300dpi.png"
    );
}

#[test]
fn empty_slug_falls_back() {
    assert_eq!(
        export_file_name("!!!", 90.0, 60.0, 300, 0.0),
        "etichetta-flacone-90x60mm-300dpi.png"
    );
    assert_eq!(
        export_file_name("", 90.0, 60.0, 300, 0.0),
        "etichetta-flacone-90x60mm-300dpi.png"
    );
}

#[test]
fn bleed_suffix_appears_only_when_nonzero() {
    assert_eq!(
        export_file_name("Flacone", 90.0, 60.0, 300, 2.0),
        "etichetta-flacone-90x60mm-300dpi-bleed2mm.png"
    );
    assert_eq!(
        export_file_name("Flacone", 90.0, 60.0, 300, 2.5),
        "etichetta-flacone-90x60mm-300dpi-bleed2.5mm.png"
    );
    assert!(!export_file_name("Flacone", 90.0, 60.0, 300, 0.0).contains("bleed"));
}

#[test]
fn fractional_mm_dimensions_keep_their_precision() {
    assert_eq!(
        export_file_name("x", 90.5, 60.0, 150, 0.0),
        "etichetta-x-90.5x60mm-150dpi.png"
    );
}

#[test]
fn crop_mark_segments_cover_the_expected_pixels() {
    let mut s = Surface::new(70, 60).unwrap();
    draw_crop_marks(&mut s, 20, 30, 20);

    let marked = s
        .data()
        .chunks_exact(4)
        .filter(|px| px[3] == 255)
        .count();
    // Eight segments of (18 - 2) pixels each, all inside the surface.
    assert_eq!(marked, 8 * 16);

    // One horizontal and one vertical segment, spot-checked.
    assert_eq!(s.pixel(2, 20), [0, 0, 0, 255]);
    assert_eq!(s.pixel(20, 2), [0, 0, 0, 255]);
    assert_eq!(s.pixel(19, 19), [0, 0, 0, 0]);
}

#[test]
fn export_state_machine_reaches_ready_and_resets() {
    let mut scene = SceneState::default();
    scene.label_geometry.width_mm = 30.0;
    scene.label_geometry.height_mm = 20.0;
    scene.export.dpi = 150;
    let assets = RenderAssets::prepare(&scene, &FontCatalog::new());

    let mut exporter = Exporter::new();
    assert_eq!(exporter.state(), ExportState::Idle);

    let artifact = exporter.export(&scene, &assets).unwrap();
    assert_eq!(exporter.state(), ExportState::Ready);
    assert!(!artifact.png.is_empty());
    assert!(artifact.file_name.starts_with("etichetta-"));

    exporter.acknowledge();
    assert_eq!(exporter.state(), ExportState::Idle);
}

#[test]
fn export_failure_is_observable() {
    let mut scene = SceneState::default();
    scene.export.dpi = 50; // below the supported range
    let assets = RenderAssets::prepare(&scene, &FontCatalog::new());

    let mut exporter = Exporter::new();
    assert!(exporter.export(&scene, &assets).is_err());
    assert_eq!(exporter.state(), ExportState::Failed);
}

#[test]
fn export_dimensions_follow_the_bleed_formula() {
    let mut scene = SceneState::default();
    scene.label_geometry.width_mm = 30.0;
    scene.label_geometry.height_mm = 20.0;
    scene.export.dpi = 150;
    scene.export.bleed_mm = 3.0;
    let assets = RenderAssets::prepare(&scene, &FontCatalog::new());

    let ppm = 150.0 / 25.4;
    let label_w = (30.0 * ppm) as u32;
    let label_h = (20.0 * ppm) as u32;
    let bleed = (3.0 * ppm) as u32;

    let artifact = Exporter::new().export(&scene, &assets).unwrap();
    assert_eq!(artifact.width, label_w + 2 * bleed);
    assert_eq!(artifact.height, label_h + 2 * bleed);

    // The PNG payload agrees with the reported dimensions.
    let decoded = image::load_from_memory(&artifact.png).unwrap();
    assert_eq!(decoded.width(), artifact.width);
    assert_eq!(decoded.height(), artifact.height);
}
