//! Rayon-parallel score surfaces (feature-gated).
//!
//! Rows of the score surface are independent, so each thread fills whole rows
//! with the same per-placement arithmetic as the sequential path; results are
//! bit-identical to [`Kernel::score_map`].

use crate::image::ImageView;
use crate::kernel::integral::WindowSums;
use crate::kernel::{placement_grid, score_row, Kernel, ScoreMap};
use crate::template::TemplatePlan;
use crate::util::RotMatchResult;
use rayon::prelude::*;

/// Row-parallel full score surface for kernel `K`.
pub fn score_map_par<K: Kernel + Sync>(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    min_var_i: f32,
) -> RotMatchResult<ScoreMap> {
    let (out_w, out_h) = placement_grid(image, plan)?;
    let sums = WindowSums::new(image)?;
    let mut data = vec![0.0f32; out_w * out_h];
    data.par_chunks_mut(out_w)
        .enumerate()
        .for_each(|(y, row)| score_row::<K>(image, plan, &sums, y, min_var_i, row));
    Ok(ScoreMap::from_vec(data, out_w, out_h))
}
