//! Template plan precomputation for normalized correlation.

use crate::image::ImageView;
use crate::util::{RotMatchError, RotMatchResult};

/// Precomputed statistics and zero-mean buffer for template matching.
///
/// The normalized correlation coefficient at a placement is
/// `sum(t' * i) / sqrt(var_t * var_i)` where `t'` is the zero-mean template,
/// `var_t = sum(t'^2)` and `var_i` is the window's sum of squared deviations.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    var_t: f32,
    zero_mean: Vec<f32>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> RotMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(RotMatchError::InvalidDimensions { width, height })?;

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for y in 0..height {
            for &value in tpl.row_checked(y)? {
                let v = value as f64;
                sum += v;
                sum_sq += v * v;
            }
        }

        let count_f = count as f64;
        let mean_f64 = sum / count_f;
        let variance = sum_sq / count_f - mean_f64 * mean_f64;
        if variance <= 1e-8 {
            return Err(RotMatchError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        let mut zero_mean = Vec::with_capacity(count);
        let mut var_t = 0.0f64;
        for y in 0..height {
            for &value in tpl.row_checked(y)? {
                let centered = value as f64 - mean_f64;
                var_t += centered * centered;
                zero_mean.push(centered as f32);
            }
        }

        Ok(Self {
            width,
            height,
            var_t: var_t as f32,
            zero_mean,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the sum of squared deviations from the mean.
    pub fn var_t(&self) -> f32 {
        self.var_t
    }

    /// Returns the zero-mean template buffer in row-major order.
    pub fn zero_mean(&self) -> &[f32] {
        &self.zero_mean
    }
}
