//! Scalar reference kernel.

use crate::image::ImageView;
use crate::kernel::Kernel;
use crate::template::TemplatePlan;

/// Scalar zero-mean normalized cross-correlation kernel.
pub struct ZnccScalar;

impl Kernel for ZnccScalar {
    fn dot_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        let tpl_width = plan.width();
        let t_prime = plan.zero_mean();
        let mut dot = 0.0f32;
        for (ty, tpl_row) in t_prime.chunks_exact(tpl_width).enumerate() {
            let Some(img_row) = image.row(y + ty) else {
                return f32::NAN;
            };
            let window = &img_row[x..x + tpl_width];
            for (&t, &value) in tpl_row.iter().zip(window) {
                dot += t * value as f32;
            }
        }
        dot
    }
}
