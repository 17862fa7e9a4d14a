use crate::foundation::core::Rect;
use crate::scene::model::FitMode;

/// Scaled size that fits `src` entirely inside `dst`, preserving aspect.
///
/// The longer source axis maps exactly onto the corresponding destination
/// axis; the other axis comes out shorter.
pub fn fit_contain(src_w: f64, src_h: f64, dst_w: f64, dst_h: f64) -> (f64, f64) {
    let sr = src_w / src_h;
    let dr = dst_w / dst_h;
    if sr > dr {
        (dst_w, dst_w / sr)
    } else {
        (dst_h * sr, dst_h)
    }
}

/// Scaled size that fully covers `dst`, preserving aspect.
///
/// The shorter source axis maps exactly onto the corresponding destination
/// axis; the other axis overflows and is cropped by the clip boundary.
pub fn fit_cover(src_w: f64, src_h: f64, dst_w: f64, dst_h: f64) -> (f64, f64) {
    let sr = src_w / src_h;
    let dr = dst_w / dst_h;
    if sr > dr {
        (dst_h * sr, dst_h)
    } else {
        (dst_w, dst_w / sr)
    }
}

/// Placement rectangle for an overlay image.
///
/// The working box is `dest` scaled uniformly by `scale` and shifted by the
/// user offset; the image is centered within it, fitted per `fit`. A `Cover`
/// placement may extend past the box — overflow is cropped later by the
/// silhouette clip, never by pre-cropping the source.
pub fn placement(
    fit: FitMode,
    src_w: f64,
    src_h: f64,
    dest: Rect,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
) -> Rect {
    let box_w = dest.width() * scale;
    let box_h = dest.height() * scale;
    let (w, h) = match fit {
        FitMode::Contain => fit_contain(src_w, src_h, box_w, box_h),
        FitMode::Cover => fit_cover(src_w, src_h, box_w, box_h),
    };
    let x0 = dest.x0 + offset_x + (box_w - w) / 2.0;
    let y0 = dest.y0 + offset_y + (box_h - h) / 2.0;
    Rect::new(x0, y0, x0 + w, y0 + h)
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
