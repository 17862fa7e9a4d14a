use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rgba8Premul};
use crate::foundation::error::{LabelError, LabelResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};

/// A premultiplied RGBA8 destination surface.
///
/// Surfaces are always repainted from a known state (transparent or a flat
/// fill) rather than incrementally patched, so render passes can accumulate
/// onto them with plain premultiplied-over composition.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
    width: u32,
    height: u32,
}

impl Surface {
    /// Allocate a zeroed (fully transparent) surface.
    ///
    /// Zero or u16-overflowing dimensions are invalid and rejected here,
    /// before any rendering happens.
    pub fn new(width: u32, height: u32) -> LabelResult<Self> {
        if width == 0 || height == 0 {
            return Err(LabelError::validation(
                "surface dimensions must be at least 1x1",
            ));
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| LabelError::render("surface width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| LabelError::render("surface height exceeds u16"))?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
            width,
            height,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill every pixel with the given premultiplied color.
    pub fn clear(&mut self, color: Rgba8Premul) {
        let rgba = color.to_array();
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Reset every pixel to fully transparent.
    pub fn clear_transparent(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
    }

    /// Premultiplied pixel bytes in row-major order.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Mutable premultiplied pixel bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    /// Read one pixel (premultiplied RGBA8). Panics outside bounds; intended
    /// for tests and debugging.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let d = self.data();
        [d[idx], d[idx + 1], d[idx + 2], d[idx + 3]]
    }

    /// Convert to straight-alpha RGBA8 bytes for encoding.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data().to_vec();
        for px in out.chunks_exact_mut(4) {
            let a = px[3] as u16;
            if a == 0 {
                px[0] = 0;
                px[1] = 0;
                px[2] = 0;
                continue;
            }
            px[0] = (((px[0] as u16) * 255 + a / 2) / a).min(255) as u8;
            px[1] = (((px[1] as u16) * 255 + a / 2) / a).min(255) as u8;
            px[2] = (((px[2] as u16) * 255 + a / 2) / a).min(255) as u8;
        }
        out
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }

    /// Snapshot this surface as an image paint for a later render pass.
    pub(crate) fn as_image_paint(&self) -> LabelResult<vello_cpu::Image> {
        image_paint_from_premul(self.data(), self.width, self.height)
    }
}

/// Composite `src` over `dst` (premultiplied), with an extra opacity factor.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> LabelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(LabelError::render(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 0 {
        return Ok(());
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);

        d[3] = add_sat_u8(sa, mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let sc = mul_div255_u8(u16::from(s[c]), op);
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = add_sat_u8(sc, dc);
        }
    }
    Ok(())
}

/// Multiply premultiplied content by the alpha channel of a mask, in place.
///
/// Content pixels where the mask is transparent drop to zero, which is what
/// confines overlay imagery to the silhouette.
pub(crate) fn apply_alpha_mask(content: &mut [u8], mask: &[u8]) -> LabelResult<()> {
    if content.len() != mask.len() || !content.len().is_multiple_of(4) {
        return Err(LabelError::render(
            "apply_alpha_mask expects equal-length rgba8 buffers",
        ));
    }
    for (c, m) in content.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let w = u16::from(m[3]);
        c[0] = mul_div255_u8(u16::from(c[0]), w);
        c[1] = mul_div255_u8(u16::from(c[1]), w);
        c[2] = mul_div255_u8(u16::from(c[2]), w);
        c[3] = mul_div255_u8(u16::from(c[3]), w);
    }
    Ok(())
}

/// Composite one whole surface over another of identical dimensions.
pub fn composite_over(dst: &mut Surface, src: &Surface, opacity: f32) -> LabelResult<()> {
    if dst.width() != src.width() || dst.height() != src.height() {
        return Err(LabelError::render(
            "composite_over expects equally sized surfaces",
        ));
    }
    premul_over_in_place(dst.data_mut(), src.data(), opacity)
}

/// Composite `src` over `dst` at pixel offset `(x, y)`, clipping at the edges.
pub fn blit_over(dst: &mut Surface, src: &Surface, x: u32, y: u32) -> LabelResult<()> {
    let dw = dst.width() as usize;
    let dh = dst.height() as usize;
    let sw = src.width() as usize;
    let sh = src.height() as usize;
    let x = x as usize;
    let y = y as usize;
    if x >= dw || y >= dh {
        return Ok(());
    }
    let copy_w = sw.min(dw - x);
    let copy_h = sh.min(dh - y);

    let src_data = src.data();
    let dst_data = dst.data_mut();
    for row in 0..copy_h {
        let s0 = row * sw * 4;
        let d0 = ((y + row) * dw + x) * 4;
        premul_over_in_place(
            &mut dst_data[d0..d0 + copy_w * 4],
            &src_data[s0..s0 + copy_w * 4],
            1.0,
        )?;
    }
    Ok(())
}

/// Fill an axis-aligned pixel rectangle directly, clamped to the surface.
pub(crate) fn fill_rect_px(
    surface: &mut Surface,
    x: i64,
    y: i64,
    w: i64,
    h: i64,
    color: Rgba8Premul,
) {
    let sw = surface.width() as i64;
    let sh = surface.height() as i64;
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(sw);
    let y1 = (y + h).min(sh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let rgba = color.to_array();
    let stride = sw as usize * 4;
    let data = surface.data_mut();
    for py in y0..y1 {
        let row = py as usize * stride;
        for px in x0..x1 {
            let idx = row + px as usize * 4;
            data[idx..idx + 4].copy_from_slice(&rgba);
        }
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> LabelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| LabelError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| LabelError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(LabelError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

pub(crate) fn image_paint_from_premul(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> LabelResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn color_to_cpu(c: crate::foundation::core::Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
