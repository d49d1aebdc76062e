//! Exhaustive angle sweep with full-grid normalized cross-correlation.
//!
//! For every angle of the sweep the search image is rotated about its own
//! center into a working buffer of the same size, the template is correlated
//! against the whole buffer, and the surface maximum is recorded. The template
//! itself is never rotated. Angles are compared by the sampled maximum or,
//! optionally, by its parabola-refined height.

use crate::geometry::ShiftValue;
use crate::image::warp::{warp_quadrangle_into, AffineMatrix};
use crate::image::{ImageView, OwnedImage};
use crate::kernel::{Kernel, Peak, ScoreMap};
use crate::search::sweep::AngleSweep;
use crate::template::TemplatePlan;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::math::half;
use crate::util::{RotMatchError, RotMatchResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::ZnccScalar as Zncc;
#[cfg(feature = "simd")]
use crate::kernel::simd::ZnccSimd as Zncc;

/// Options shared by every sweep of a pipeline run.
#[derive(Clone, Copy, Debug)]
pub struct SweepOptions {
    /// Windows with a sum of squared deviations at or below this score 0.
    pub min_var_i: f32,
    /// Evaluate angles in parallel (requires the `rayon` feature).
    pub parallel: bool,
    /// Rank angles by the parabola-refined peak height instead of the
    /// sampled maximum. Reported scores stay the sampled values.
    pub interpolate_peaks: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            min_var_i: 1e-8,
            parallel: false,
            interpolate_peaks: false,
        }
    }
}

/// Best placement found by an angle sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleMatch {
    /// Template center relative to the search image center, in the frame
    /// rotated by `shift.angle_deg`.
    pub shift: ShiftValue,
    /// Normalized correlation score of the winning placement.
    pub score: f32,
    /// Top-left placement in the rotated search image.
    pub top_left: (usize, usize),
    /// Number of angles evaluated.
    pub angles_evaluated: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct AngleEval {
    pub(crate) angle_deg: f64,
    pub(crate) peak: Peak,
    /// Value the sweep compares angles by.
    pub(crate) rank: f32,
}

/// Picks the best evaluation in iteration order.
///
/// A later evaluation replaces the running best only with a strictly greater
/// rank, so among equal ranks the earliest angle wins.
pub(crate) fn select_best<I>(evals: I) -> Option<AngleEval>
where
    I: IntoIterator<Item = AngleEval>,
{
    let mut best: Option<AngleEval> = None;
    for eval in evals {
        if best.map_or(true, |b| eval.rank > b.rank) {
            best = Some(eval);
        }
    }
    best
}

/// Finds the rotation and translation of `template` inside `search`.
///
/// Returns the template center offset from the search image center (integer
/// halves of both sizes) paired with the winning angle.
pub fn match_with_angle(
    template: ImageView<'_, u8>,
    search: ImageView<'_, u8>,
    sweep: &AngleSweep,
    opts: &SweepOptions,
) -> RotMatchResult<AngleMatch> {
    if !template.size().fits_in(search.size()) {
        return Err(RotMatchError::TemplateLargerThanImage {
            tpl_width: template.width(),
            tpl_height: template.height(),
            img_width: search.width(),
            img_height: search.height(),
        });
    }

    let angles = sweep.angles();
    let _span = trace_span!(
        "angle_sweep",
        angles = angles.len(),
        half_range = sweep.half_range_deg(),
        step = sweep.step_deg()
    )
    .entered();
    for warning in sweep.warnings() {
        trace_warn!("angle_sweep_config", warning = format!("{warning:?}").as_str());
    }

    let plan = TemplatePlan::from_view(template)?;
    let evals = evaluate_angles(search, &plan, &angles, opts)?;
    let best = select_best(evals).ok_or(RotMatchError::InvalidInput(
        "angle sweep produced no finite score",
    ))?;

    let x = best.peak.x as f64 + half(template.width()) - half(search.width());
    let y = best.peak.y as f64 + half(template.height()) - half(search.height());
    trace_event!(
        "angle_sweep_best",
        angle = best.angle_deg,
        score = best.peak.score,
        x = x,
        y = y
    );

    Ok(AngleMatch {
        shift: ShiftValue::new(x, y, best.angle_deg),
        score: best.peak.score,
        top_left: (best.peak.x, best.peak.y),
        angles_evaluated: angles.len(),
    })
}

fn evaluate_angles(
    search: ImageView<'_, u8>,
    plan: &TemplatePlan,
    angles: &[f64],
    opts: &SweepOptions,
) -> RotMatchResult<Vec<AngleEval>> {
    #[cfg(feature = "rayon")]
    {
        if opts.parallel && angles.len() > 1 {
            let results: Vec<RotMatchResult<Option<AngleEval>>> = angles
                .par_iter()
                .map(|&angle_deg| {
                    let mut buf = OwnedImage::filled(search.width(), search.height(), 0)?;
                    let row_opts = SweepOptions {
                        parallel: false,
                        ..*opts
                    };
                    evaluate_angle(search, plan, angle_deg, &mut buf, &row_opts)
                })
                .collect();
            let mut evals = Vec::with_capacity(results.len());
            for result in results {
                evals.extend(result?);
            }
            return Ok(evals);
        }
    }

    let mut buf = OwnedImage::filled(search.width(), search.height(), 0)?;
    let mut evals = Vec::with_capacity(angles.len());
    for &angle_deg in angles {
        evals.extend(evaluate_angle(search, plan, angle_deg, &mut buf, opts)?);
    }
    Ok(evals)
}

fn evaluate_angle(
    search: ImageView<'_, u8>,
    plan: &TemplatePlan,
    angle_deg: f64,
    buf: &mut OwnedImage,
    opts: &SweepOptions,
) -> RotMatchResult<Option<AngleEval>> {
    let matrix = AffineMatrix::rotation_about_center(angle_deg, search.size());
    warp_quadrangle_into(search, &matrix, buf)?;
    let map = score_surface(buf.view(), plan, opts.min_var_i, opts.parallel)?;
    Ok(map.argmax().map(|peak| {
        let rank = if opts.interpolate_peaks {
            map.interpolated_peak(&peak)
        } else {
            peak.score
        };
        AngleEval {
            angle_deg,
            peak,
            rank,
        }
    }))
}

fn score_surface(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    min_var_i: f32,
    parallel: bool,
) -> RotMatchResult<ScoreMap> {
    #[cfg(feature = "rayon")]
    {
        if parallel {
            return crate::kernel::rayon::score_map_par::<Zncc>(image, plan, min_var_i);
        }
    }
    let _ = parallel;
    <Zncc as Kernel>::score_map(image, plan, min_var_i)
}
