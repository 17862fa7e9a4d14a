use super::*;
use crate::foundation::error::LabelError;
use std::io::Cursor;

fn tiny_png(r: u8, g: u8, b: u8, a: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, vec![r, g, b, a]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn upload_validation_accepts_png_within_cap() {
    let png = tiny_png(1, 2, 3, 255);
    validate_upload(&png, LOGO_MAX_BYTES).unwrap();
}

#[test]
fn upload_validation_rejects_oversize_before_sniffing() {
    let png = tiny_png(1, 2, 3, 255);
    let err = validate_upload(&png, png.len() - 1).unwrap_err();
    assert!(matches!(err, LabelError::SizeLimitExceeded { .. }));
}

#[test]
fn upload_validation_rejects_unknown_containers() {
    let err = validate_upload(b"plain text pretending", LOGO_MAX_BYTES).unwrap_err();
    assert!(matches!(err, LabelError::UnsupportedFormat(_)));

    // A real but unaccepted format (GIF) is also refused.
    let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
    let err = validate_upload(gif, LOGO_MAX_BYTES).unwrap_err();
    assert!(matches!(err, LabelError::UnsupportedFormat(_)));
}

#[test]
fn decode_image_premultiplies() {
    let png = tiny_png(255, 128, 0, 128);
    let img = decode_image(&png).unwrap();
    assert_eq!((img.width, img.height), (1, 1));
    let px = &img.rgba8_premul[0..4];
    assert_eq!(px[3], 128);
    assert!(px[0].abs_diff(128) <= 1);
    assert!(px[1].abs_diff(64) <= 1);
    assert_eq!(px[2], 0);
}

#[test]
fn decode_image_reports_malformed_bytes() {
    let err = decode_image(b"not an image at all").unwrap_err();
    assert!(matches!(err, LabelError::ImageDecode(_)));
}

#[test]
fn qr_modules_are_square_and_deterministic() {
    let a = qr_modules("https://example.com").unwrap();
    let b = qr_modules("https://example.com").unwrap();
    assert_eq!(a.size, b.size);
    assert_eq!(a.dark, b.dark);
    assert_eq!(a.dark.len(), a.size * a.size);
    assert!(a.size >= 21); // version 1 lower bound
    assert!(a.dark.iter().any(|&d| d));
    assert!(a.dark.iter().any(|&d| !d));
}

#[test]
fn qr_bitmap_rasterizes_at_exact_size() {
    let modules = qr_modules("labelkit").unwrap();
    let bmp = qr_bitmap(&modules, 64).unwrap();
    assert_eq!((bmp.width, bmp.height), (64, 64));
    assert_eq!(bmp.rgba8_premul.len(), 64 * 64 * 4);
    // Every pixel is opaque black or white; no quiet margin is added.
    for px in bmp.rgba8_premul.chunks_exact(4) {
        assert_eq!(px[3], 255);
        assert!(px[0] == 0 || px[0] == 255);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }
    // The finder pattern makes the top-left module dark.
    assert_eq!(bmp.rgba8_premul[0], 0);

    assert!(qr_bitmap(&modules, 0).is_err());
}

#[test]
fn font_catalog_resolves_registered_families() {
    let mut catalog = FontCatalog::new();
    catalog.register("Inter", vec![0xAA, 0xBB]);
    assert!(catalog.get("Inter").is_some());
    assert!(catalog.get("Poppins").is_none());
}

#[test]
fn prepare_skips_failed_elements_without_erroring() {
    let mut scene = crate::scene::model::SceneState::default();
    scene.overlay_image = Some(crate::scene::model::OverlayImage {
        source_bytes: vec![1, 2, 3], // undecodable
        fit: crate::scene::model::FitMode::Contain,
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
        opacity: 1.0,
    });
    scene.logo_image = Some(tiny_png(9, 9, 9, 255));
    scene.qr_content = "   ".to_string(); // blank disables the glyph

    let assets = RenderAssets::prepare(&scene, &FontCatalog::new());
    assert!(assets.overlay.is_none());
    assert!(assets.logo.is_some());
    assert!(assets.qr.is_none());
    // The default family is not in the empty catalog; text paints as absent.
    assert!(assets.font(&scene.font_family).is_none());
}

#[test]
fn prepare_generates_qr_for_non_blank_content() {
    let mut scene = crate::scene::model::SceneState::default();
    scene.qr_content = "https://example.com/p/42".to_string();
    let assets = RenderAssets::prepare(&scene, &FontCatalog::new());
    assert!(assets.qr.is_some());
}
