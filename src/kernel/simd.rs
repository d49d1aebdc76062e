//! SIMD-accelerated kernel using the `wide` crate.
//!
//! The template row loop is vectorized to process 8 pixels at a time using
//! `f32x8`, with a scalar tail for widths that are not a multiple of 8.

use crate::image::ImageView;
use crate::kernel::Kernel;
use crate::template::TemplatePlan;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 u8 values and convert to f32x8.
#[inline]
fn load_u8x8_as_f32x8(slice: &[u8]) -> f32x8 {
    f32x8::from([
        slice[0] as f32,
        slice[1] as f32,
        slice[2] as f32,
        slice[3] as f32,
        slice[4] as f32,
        slice[5] as f32,
        slice[6] as f32,
        slice[7] as f32,
    ])
}

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Horizontal sum of f32x8.
#[inline]
fn hsum(v: f32x8) -> f32 {
    v.to_array().iter().sum()
}

/// SIMD zero-mean normalized cross-correlation kernel.
pub struct ZnccSimd;

impl Kernel for ZnccSimd {
    fn dot_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        let tpl_width = plan.width();
        let t_prime = plan.zero_mean();
        let simd_end = tpl_width / LANES * LANES;

        let mut dot_vec = f32x8::ZERO;
        let mut dot_s = 0.0f32;
        for (ty, tpl_row) in t_prime.chunks_exact(tpl_width).enumerate() {
            let Some(img_row) = image.row(y + ty) else {
                return f32::NAN;
            };
            let window = &img_row[x..x + tpl_width];

            let mut tx = 0;
            while tx < simd_end {
                let img_vals = load_u8x8_as_f32x8(&window[tx..]);
                let tpl_vals = load_f32x8(&tpl_row[tx..]);
                dot_vec += tpl_vals * img_vals;
                tx += LANES;
            }
            while tx < tpl_width {
                dot_s += tpl_row[tx] * window[tx] as f32;
                tx += 1;
            }
        }
        hsum(dot_vec) + dot_s
    }
}

#[cfg(test)]
mod tests {
    use super::ZnccSimd;
    use crate::kernel::scalar::ZnccScalar;
    use crate::kernel::Kernel;
    use crate::template::TemplatePlan;
    use crate::ImageView;

    fn noise(i: usize) -> u8 {
        let mut v = i as u32 ^ 0x9E37_79B9;
        v ^= v << 13;
        v ^= v >> 17;
        v ^= v << 5;
        (v & 0xFF) as u8
    }

    #[test]
    fn simd_matches_scalar_scores() {
        let width = 40;
        let height = 30;
        let image: Vec<u8> = (0..width * height).map(noise).collect();
        let view = ImageView::from_slice(&image, width, height).unwrap();
        let plan = TemplatePlan::from_view(view.roi(5, 6, 19, 11).unwrap()).unwrap();
        let scalar = <ZnccScalar as Kernel>::score_map(view, &plan, 1e-8).unwrap();
        let simd = <ZnccSimd as Kernel>::score_map(view, &plan, 1e-8).unwrap();
        for (a, b) in scalar.data().iter().zip(simd.data()) {
            assert!((a - b).abs() < 1e-4);
        }
        let peak = simd.argmax().unwrap();
        assert_eq!((peak.x, peak.y), (5, 6));
    }
}
