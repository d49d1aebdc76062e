//! Quadrangle resampling through a 2x3 affine matrix.
//!
//! For a destination pixel `(x, y)` the source is sampled at
//! `M * (x - w / 2, y - h / 2, 1)` with integer halves, i.e. destination
//! offsets are measured from the same center pixel the rotation matrix
//! translates to. A zero-angle warp is therefore an exact copy for every
//! size. Sampling is bilinear; coordinates outside the source replicate the
//! nearest border pixel.

use crate::geometry::Size;
use crate::image::{ImageView, OwnedImage};
use crate::util::math::{half, sin_cos_deg};
use crate::util::RotMatchResult;

/// Row-major 2x3 affine matrix `[[a, b, tx], [c, d, ty]]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineMatrix(pub [[f64; 3]; 2]);

impl AffineMatrix {
    /// Rotation by `angle_deg` about the center of an image of `size`.
    ///
    /// Uses `[[cos, sin, w / 2], [-sin, cos, h / 2]]` with integer halves.
    pub fn rotation_about_center(angle_deg: f64, size: Size) -> Self {
        let (sin, cos) = sin_cos_deg(angle_deg);
        Self([[cos, sin, half(size.width)], [-sin, cos, half(size.height)]])
    }

    /// Maps a destination-center-relative offset into source coordinates.
    #[inline]
    pub fn apply(&self, dx: f64, dy: f64) -> (f64, f64) {
        let m = &self.0;
        (
            m[0][0] * dx + m[0][1] * dy + m[0][2],
            m[1][0] * dx + m[1][1] * dy + m[1][2],
        )
    }
}

/// Resamples `src` through `matrix` into a buffer of `out_size`.
pub fn warp_quadrangle(
    src: ImageView<'_, u8>,
    matrix: &AffineMatrix,
    out_size: Size,
) -> RotMatchResult<OwnedImage> {
    let mut out = OwnedImage::filled(out_size.width, out_size.height, 0)?;
    warp_quadrangle_into(src, matrix, &mut out)?;
    Ok(out)
}

/// Resamples `src` through `matrix` into an existing buffer.
///
/// Reusing `dst` across calls lets the angle sweep keep a single working
/// buffer per stage.
pub fn warp_quadrangle_into(
    src: ImageView<'_, u8>,
    matrix: &AffineMatrix,
    dst: &mut OwnedImage,
) -> RotMatchResult<()> {
    let src_w = src.width();
    let src_h = src.height();
    let max_x = (src_w - 1) as f64;
    let max_y = (src_h - 1) as f64;
    let out_w = dst.width();
    let out_h = dst.height();
    let cx = half(out_w);
    let cy = half(out_h);

    let out = dst.data_mut();
    for y in 0..out_h {
        let dy = y as f64 - cy;
        for x in 0..out_w {
            let dx = x as f64 - cx;
            let (sx, sy) = matrix.apply(dx, dy);
            let sx = if sx.is_finite() { sx.clamp(0.0, max_x) } else { 0.0 };
            let sy = if sy.is_finite() { sy.clamp(0.0, max_y) } else { 0.0 };

            let x0 = sx.floor() as usize;
            let y0 = sy.floor() as usize;
            let x1 = (x0 + 1).min(src_w - 1);
            let y1 = (y0 + 1).min(src_h - 1);
            let fx = (sx - x0 as f64) as f32;
            let fy = (sy - y0 as f64) as f32;

            let row0 = src.row_checked(y0)?;
            let row1 = src.row_checked(y1)?;
            let a = row0[x0] as f32;
            let b = row0[x1] as f32;
            let c = row1[x0] as f32;
            let d = row1[x1] as f32;

            let top = a + (b - a) * fx;
            let bottom = c + (d - c) * fx;
            let value = top + (bottom - top) * fy;
            out[y * out_w + x] = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    Ok(())
}

/// Rotates a whole image by `angle_deg` about its center, keeping its size.
///
/// An angle of exactly zero returns an unmodified copy.
pub fn rotate_image(src: ImageView<'_, u8>, angle_deg: f64) -> RotMatchResult<OwnedImage> {
    if angle_deg == 0.0 {
        return OwnedImage::from_view(src);
    }
    let size = src.size();
    let matrix = AffineMatrix::rotation_about_center(angle_deg, size);
    warp_quadrangle(src, &matrix, size)
}

#[cfg(test)]
mod tests {
    use super::{rotate_image, warp_quadrangle, AffineMatrix};
    use crate::geometry::Size;
    use crate::image::ImageView;

    #[test]
    fn odd_sized_identity_warp_is_exact() {
        let data: Vec<u8> = (0u8..25).map(|v| v * 10).collect();
        let view = ImageView::from_slice(&data, 5, 5).unwrap();
        let m = AffineMatrix::rotation_about_center(0.0, view.size());
        let out = warp_quadrangle(view, &m, view.size()).unwrap();
        assert_eq!(out.data(), data.as_slice());
    }

    #[test]
    fn even_sized_identity_warp_is_exact() {
        let data: Vec<u8> = (0u8..48).map(|v| v.wrapping_mul(37)).collect();
        let view = ImageView::from_slice(&data, 8, 6).unwrap();
        let m = AffineMatrix::rotation_about_center(0.0, view.size());
        let out = warp_quadrangle(view, &m, view.size()).unwrap();
        assert_eq!(out.data(), data.as_slice());
    }

    #[test]
    fn quarter_turn_pivots_on_integer_center() {
        // 4x4 pivots on (2, 2); the pixel above it samples the one to its left.
        let data: Vec<u8> = (0u8..16).collect();
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        let out = rotate_image(view, 90.0).unwrap();
        assert_eq!(out.data()[2 * 4 + 2], 10);
        assert_eq!(out.data()[4 + 2], 9);
    }

    #[test]
    fn half_turn_flips_odd_image() {
        let data: Vec<u8> = (0u8..9).collect();
        let view = ImageView::from_slice(&data, 3, 3).unwrap();
        let out = rotate_image(view, 180.0).unwrap();
        assert_eq!(out.data(), &[8, 7, 6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn window_warp_samples_around_translation() {
        let data: Vec<u8> = (0u8..16).collect();
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        let m = AffineMatrix([[1.0, 0.0, 2.0], [0.0, 1.0, 1.0]]);
        let out = warp_quadrangle(view, &m, Size::new(1, 1)).unwrap();
        assert_eq!(out.data(), &[6]);
    }
}
