//! Correlation kernels producing full score surfaces.
//!
//! A score surface has one normalized correlation coefficient per template
//! placement, `(img_w - tpl_w + 1) x (img_h - tpl_h + 1)` entries indexed by
//! the placement's top-left corner. Window sums come from integral tables;
//! kernels only provide the template/window dot product.

use crate::image::ImageView;
use crate::template::TemplatePlan;
use crate::util::{RotMatchError, RotMatchResult};

pub mod integral;
pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

use integral::WindowSums;

/// Location and value of a score surface maximum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the placement's top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the placement's top-left corner.
    pub y: usize,
    /// Correlation score at the peak.
    pub score: f32,
}

/// Dense score surface in row-major order.
#[derive(Clone, Debug)]
pub struct ScoreMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ScoreMap {
    pub(crate) fn from_vec(data: Vec<f32>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    /// Returns the number of placements along x.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of placements along y.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the scores in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the score for the placement at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns the first maximum in row-major order.
    ///
    /// Later entries replace the running maximum only when strictly greater.
    pub fn argmax(&self) -> Option<Peak> {
        let mut best: Option<Peak> = None;
        for (idx, &score) in self.data.iter().enumerate() {
            if score.is_nan() {
                continue;
            }
            if best.map_or(true, |b| score > b.score) {
                best = Some(Peak {
                    x: idx % self.width,
                    y: idx / self.width,
                    score,
                });
            }
        }
        best
    }

    /// Estimates the surface maximum near `peak` with separable parabolic fits.
    ///
    /// Each axis contributes the height of the parabola through the peak and
    /// its two neighbors above the sampled peak. An axis contributes nothing
    /// when a neighbor falls outside the surface, the samples are not concave,
    /// or the vertex lies more than one cell away.
    pub fn interpolated_peak(&self, peak: &Peak) -> f32 {
        let (x, y) = (peak.x, peak.y);
        let center = peak.score as f64;
        let mut value = center;
        if x > 0 {
            if let (Some(left), Some(right)) = (self.get(x - 1, y), self.get(x + 1, y)) {
                value += parabolic_lift(left as f64, center, right as f64);
            }
        }
        if y > 0 {
            if let (Some(up), Some(down)) = (self.get(x, y - 1), self.get(x, y + 1)) {
                value += parabolic_lift(up as f64, center, down as f64);
            }
        }
        value as f32
    }
}

fn parabolic_lift(prev: f64, center: f64, next: f64) -> f64 {
    let curvature = prev - 2.0 * center + next;
    if curvature.is_nan() || curvature >= 0.0 {
        return 0.0;
    }
    let vertex = (prev - next) / (2.0 * curvature);
    if vertex.abs() > 1.0 || !vertex.is_finite() {
        return 0.0;
    }
    -(prev - next) * vertex / 4.0
}

/// Kernel trait for computing the template/window dot product.
pub trait Kernel {
    /// Returns `sum(t' * i)` for the window whose top-left corner is `(x, y)`.
    ///
    /// Callers guarantee the placement lies fully inside `image`.
    fn dot_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32;

    /// Scores every valid placement of `plan` over `image`.
    fn score_map(
        image: ImageView<'_, u8>,
        plan: &TemplatePlan,
        min_var_i: f32,
    ) -> RotMatchResult<ScoreMap>
    where
        Self: Sized,
    {
        let (out_w, out_h) = placement_grid(image, plan)?;
        let sums = WindowSums::new(image)?;
        let mut data = vec![0.0f32; out_w * out_h];
        for (y, row) in data.chunks_mut(out_w).enumerate() {
            score_row::<Self>(image, plan, &sums, y, min_var_i, row);
        }
        Ok(ScoreMap::from_vec(data, out_w, out_h))
    }
}

/// Returns the placement grid size, rejecting templates larger than the image.
pub(crate) fn placement_grid(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
) -> RotMatchResult<(usize, usize)> {
    let img_width = image.width();
    let img_height = image.height();
    let tpl_width = plan.width();
    let tpl_height = plan.height();
    if img_width < tpl_width || img_height < tpl_height {
        return Err(RotMatchError::TemplateLargerThanImage {
            tpl_width,
            tpl_height,
            img_width,
            img_height,
        });
    }
    Ok((img_width - tpl_width + 1, img_height - tpl_height + 1))
}

/// Fills one row of the score surface.
pub(crate) fn score_row<K: Kernel>(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    sums: &WindowSums,
    y: usize,
    min_var_i: f32,
    out: &mut [f32],
) {
    let tpl_width = plan.width();
    let tpl_height = plan.height();
    let n = (tpl_width * tpl_height) as f64;
    let var_t = plan.var_t() as f64;
    for (x, value) in out.iter_mut().enumerate() {
        let (sum_i, sum_i2) = sums.window(x, y, tpl_width, tpl_height);
        let sum_i = sum_i as f64;
        let var_i = sum_i2 as f64 - sum_i * sum_i / n;
        if var_i <= min_var_i as f64 {
            *value = 0.0;
            continue;
        }
        let dot = K::dot_at(image, plan, x, y) as f64;
        let score = dot / (var_t * var_i).sqrt();
        *value = if score.is_finite() { score as f32 } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::{Peak, ScoreMap};

    #[test]
    fn symmetric_neighbors_add_no_lift() {
        let map = ScoreMap::from_vec(vec![0.5, 0.8, 0.5, 0.4, 0.9, 0.4, 0.5, 0.8, 0.5], 3, 3);
        let peak = map.argmax().unwrap();
        assert_eq!((peak.x, peak.y), (1, 1));
        assert!((map.interpolated_peak(&peak) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn lopsided_neighbors_lift_the_peak() {
        // Samples of 1 - (x - 1.25)^2 at x = 0, 1, 2 peak at exactly 1.0.
        let map = ScoreMap::from_vec(vec![-0.5625, 0.9375, 0.4375], 3, 1);
        let peak = map.argmax().unwrap();
        assert_eq!(peak.x, 1);
        assert!((map.interpolated_peak(&peak) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn border_peak_keeps_raw_score() {
        let map = ScoreMap::from_vec(vec![0.9, 0.7, 0.2, 0.6, 0.5, 0.1], 3, 2);
        let peak = Peak {
            x: 0,
            y: 0,
            score: 0.9,
        };
        assert_eq!(map.interpolated_peak(&peak), 0.9);
    }
}
