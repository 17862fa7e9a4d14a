use super::*;

#[test]
fn new_rejects_degenerate_dimensions() {
    assert!(Surface::new(0, 10).is_err());
    assert!(Surface::new(10, 0).is_err());
    assert!(Surface::new(1, 1).is_ok());
    assert!(Surface::new(70_000, 1).is_err());
}

#[test]
fn clear_fills_every_pixel() {
    let mut s = Surface::new(3, 2).unwrap();
    let c = Rgba8Premul::from_straight_rgba(10, 20, 30, 255);
    s.clear(c);
    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(s.pixel(x, y), [10, 20, 30, 255]);
        }
    }
    s.clear_transparent();
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn premul_over_obeys_identity_cases() {
    // Opaque source replaces destination.
    let mut dst = vec![1u8, 2, 3, 255];
    premul_over_in_place(&mut dst, &[100, 110, 120, 255], 1.0).unwrap();
    assert_eq!(dst, vec![100, 110, 120, 255]);

    // Transparent source leaves destination alone.
    let mut dst = vec![9u8, 8, 7, 255];
    premul_over_in_place(&mut dst, &[0, 0, 0, 0], 1.0).unwrap();
    assert_eq!(dst, vec![9, 8, 7, 255]);

    // Zero opacity is a no-op.
    let mut dst = vec![9u8, 8, 7, 255];
    premul_over_in_place(&mut dst, &[100, 100, 100, 255], 0.0).unwrap();
    assert_eq!(dst, vec![9, 8, 7, 255]);
}

#[test]
fn premul_over_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(premul_over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
    let mut dst = vec![0u8; 3];
    assert!(premul_over_in_place(&mut dst, &[0u8; 3], 1.0).is_err());
}

#[test]
fn alpha_mask_keeps_inside_and_zeroes_outside() {
    let mut content = vec![
        200u8, 100, 50, 255, // inside the mask
        200, 100, 50, 255, // outside the mask
    ];
    let mask = vec![
        255u8, 255, 255, 255, // opaque
        0, 0, 0, 0, // transparent
    ];
    apply_alpha_mask(&mut content, &mask).unwrap();
    assert_eq!(&content[0..4], &[200, 100, 50, 255]);
    assert_eq!(&content[4..8], &[0, 0, 0, 0]);
}

#[test]
fn alpha_mask_scales_partial_coverage() {
    let mut content = vec![200u8, 100, 50, 255];
    let mask = vec![0u8, 0, 0, 128];
    apply_alpha_mask(&mut content, &mask).unwrap();
    assert!(content[0].abs_diff(100) <= 1);
    assert!(content[3].abs_diff(128) <= 1);
}

#[test]
fn composite_over_requires_equal_sizes() {
    let mut a = Surface::new(2, 2).unwrap();
    let b = Surface::new(3, 2).unwrap();
    assert!(composite_over(&mut a, &b, 1.0).is_err());
}

#[test]
fn blit_over_clips_at_edges() {
    let mut dst = Surface::new(4, 4).unwrap();
    let mut src = Surface::new(3, 3).unwrap();
    src.clear(Rgba8Premul::from_straight_rgba(255, 0, 0, 255));

    blit_over(&mut dst, &src, 2, 2).unwrap();
    assert_eq!(dst.pixel(2, 2), [255, 0, 0, 255]);
    assert_eq!(dst.pixel(3, 3), [255, 0, 0, 255]);
    assert_eq!(dst.pixel(1, 1), [0, 0, 0, 0]);

    // Fully out of bounds is a no-op.
    let mut dst2 = Surface::new(4, 4).unwrap();
    blit_over(&mut dst2, &src, 9, 9).unwrap();
    assert!(dst2.data().iter().all(|&b| b == 0));
}

#[test]
fn fill_rect_px_clamps_to_surface() {
    let mut s = Surface::new(4, 4).unwrap();
    let ink = Rgba8Premul::from_straight_rgba(0, 0, 0, 255);
    fill_rect_px(&mut s, -2, -2, 4, 4, ink);
    assert_eq!(s.pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(s.pixel(1, 1), [0, 0, 0, 255]);
    assert_eq!(s.pixel(2, 2), [0, 0, 0, 0]);

    // Entirely outside draws nothing.
    let mut s2 = Surface::new(4, 4).unwrap();
    fill_rect_px(&mut s2, -10, 0, 5, 1, ink);
    fill_rect_px(&mut s2, 10, 0, 5, 1, ink);
    assert!(s2.data().iter().all(|&b| b == 0));
}

#[test]
fn straight_rgba_conversion_inverts_premultiply() {
    let mut s = Surface::new(1, 1).unwrap();
    s.clear(Rgba8Premul::from_straight_rgba(200, 100, 40, 128));
    let straight = s.to_straight_rgba();
    assert!(straight[0].abs_diff(200) <= 2);
    assert!(straight[1].abs_diff(100) <= 2);
    assert!(straight[2].abs_diff(40) <= 2);
    assert_eq!(straight[3], 128);

    // Fully transparent pixels normalize to zero.
    s.clear_transparent();
    assert_eq!(s.to_straight_rgba(), vec![0, 0, 0, 0]);
}
