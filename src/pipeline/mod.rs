//! Coarse-to-fine rotated template matching.
//!
//! The pipeline runs in two stages:
//! 1. A coarse angle sweep over Gaussian-downsampled copies of the template
//!    and the source, covering the full requested angular range.
//! 2. A fine angle sweep over edge maps of the full-resolution template and a
//!    window of the source rotated by the coarse angle, covering a narrow range
//!    around the coarse estimate.
//!
//! Both stages correlate only the interior of the template. Filters replicate
//! the template's own border, which the scene does not share, so a band as
//! wide as the filter support is dropped from each side. The offsets reported
//! still refer to the full template center.
//!
//! The two stage transforms are chained with [`compose_transforms`] and the
//! result is reported in absolute source coordinates (template center).

use crate::edge::{expand_edges, EdgeConfig};
use crate::geometry::{compose_transforms, window_around, Point, Rect, ShiftValue};
use crate::image::pyramid::{pyr_down_n, pyramid_depth, DEFAULT_MIN_PYRAMID_LEN};
use crate::image::warp::rotate_image;
use crate::image::OwnedImage;
use crate::search::{match_with_angle, AngleMatch, AngleSweep, ConfigWarning, SweepOptions};
use crate::trace::{trace_event, trace_span};
use crate::util::math::half;
use crate::util::{RotMatchError, RotMatchResult};
use crate::ImageView;

/// Largest accepted angular half range, in degrees.
pub const MAX_ANGLE_DEG: f64 = 180.0;

/// Reach of the 5-tap pyramid kernel.
const COARSE_BORDER_BAND: usize = 2;

/// Configuration for the coarse-to-fine matcher.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Minimum template dimension kept at the coarse pyramid level.
    pub min_pyramid_len: usize,
    /// Angle step of the coarse sweep in degrees.
    pub coarse_step_deg: f64,
    /// Fine half range as a multiple of the coarse step.
    pub fine_range_factor: f64,
    /// Fine step as a multiple of the coarse step.
    pub fine_step_factor: f64,
    /// Fraction of the template size added on each side of the fine window.
    pub roi_expand: f64,
    /// Edge enhancement applied before the fine sweep.
    pub edge: EdgeConfig,
    /// Minimum window variance for a placement to receive a non-zero score.
    pub min_var_i: f32,
    /// Evaluate sweep angles in parallel when the `rayon` feature is enabled.
    /// Ignored otherwise.
    pub parallel: bool,
    /// Rank coarse angles by the sub-pixel peak height, which removes the
    /// bias towards angles whose peak happens to fall on the pixel grid.
    pub interpolate_coarse_peaks: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_pyramid_len: DEFAULT_MIN_PYRAMID_LEN,
            coarse_step_deg: 0.5,
            fine_range_factor: 1.5,
            fine_step_factor: 0.1,
            roi_expand: 0.2,
            edge: EdgeConfig::default(),
            min_var_i: 1e-8,
            parallel: false,
            interpolate_coarse_peaks: true,
        }
    }
}

impl MatchConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> RotMatchResult<()> {
        if !self.coarse_step_deg.is_finite() || self.coarse_step_deg <= 0.0 {
            return Err(RotMatchError::InvalidInput(
                "coarse_step_deg must be finite and > 0",
            ));
        }
        if !self.fine_range_factor.is_finite() || self.fine_range_factor < 0.0 {
            return Err(RotMatchError::InvalidInput(
                "fine_range_factor must be finite and >= 0",
            ));
        }
        if !self.fine_step_factor.is_finite() || self.fine_step_factor < 0.0 {
            return Err(RotMatchError::InvalidInput(
                "fine_step_factor must be finite and >= 0",
            ));
        }
        if !self.roi_expand.is_finite() || self.roi_expand < 0.0 {
            return Err(RotMatchError::InvalidInput(
                "roi_expand must be finite and >= 0",
            ));
        }
        if !self.min_var_i.is_finite() || self.min_var_i < 0.0 {
            return Err(RotMatchError::InvalidInput("min_var_i must be finite and >= 0"));
        }
        self.edge.validate()
    }

    fn sweep_options(&self, interpolate_peaks: bool) -> SweepOptions {
        SweepOptions {
            min_var_i: self.min_var_i,
            parallel: self.parallel,
            interpolate_peaks,
        }
    }
}

/// Per-stage trace of a pipeline run.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchReport {
    /// Template center in absolute source coordinates and its rotation.
    pub result: ShiftValue,
    /// Coarse estimate rescaled to full resolution, relative to the source center.
    pub coarse: ShiftValue,
    /// Fine estimate relative to the center of the refine window.
    pub fine: ShiftValue,
    /// Number of pyramid levels used by the coarse stage.
    pub depth: usize,
    pub coarse_score: f32,
    pub fine_score: f32,
    /// Refine window in the coarse-rotated source.
    pub window: Rect,
    /// Non-fatal sweep configuration problems.
    pub warnings: Vec<ConfigWarning>,
}

/// Coarse-to-fine rotated template matcher.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    cfg: MatchConfig,
}

impl Matcher {
    /// Creates a matcher after validating `cfg`.
    pub fn new(cfg: MatchConfig) -> RotMatchResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the matcher configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Locates `template` in `source` within `±max_angle_deg`.
    ///
    /// Returns the template center in absolute source coordinates and the
    /// rotation angle. Matches whose fine score is below `score_threshold`
    /// are rejected with [`RotMatchError::BelowThreshold`]; pass
    /// `f32::NEG_INFINITY` to accept any score.
    pub fn match_template(
        &self,
        template: ImageView<'_, u8>,
        source: ImageView<'_, u8>,
        max_angle_deg: f64,
        score_threshold: f32,
    ) -> RotMatchResult<ShiftValue> {
        self.match_template_report(template, source, max_angle_deg, score_threshold)
            .map(|report| report.result)
    }

    /// Same as [`Matcher::match_template`] but returns the per-stage trace.
    pub fn match_template_report(
        &self,
        template: ImageView<'_, u8>,
        source: ImageView<'_, u8>,
        max_angle_deg: f64,
        score_threshold: f32,
    ) -> RotMatchResult<MatchReport> {
        let cfg = &self.cfg;
        validate_request(template, source, max_angle_deg, score_threshold)?;
        let _span = trace_span!(
            "match_template",
            tpl_width = template.width(),
            tpl_height = template.height(),
            img_width = source.width(),
            img_height = source.height(),
            max_angle = max_angle_deg
        )
        .entered();

        let depth = pyramid_depth(template.size(), source.size(), cfg.min_pyramid_len)?;
        trace_event!("pyramid_depth", depth = depth);

        let mut warnings = Vec::new();
        let coarse = self.coarse_stage(template, source, depth, max_angle_deg, &mut warnings)?;
        let scale = (1u64 << depth) as f64;
        let coarse_full = ShiftValue::new(
            coarse.shift.x * scale,
            coarse.shift.y * scale,
            coarse.shift.angle_deg,
        );
        trace_event!(
            "coarse_result",
            x = coarse_full.x,
            y = coarse_full.y,
            angle = coarse_full.angle_deg,
            score = coarse.score
        );

        let (fine, window) = self.fine_stage(template, source, coarse_full, &mut warnings)?;
        trace_event!(
            "fine_result",
            x = fine.shift.x,
            y = fine.shift.y,
            angle = fine.shift.angle_deg,
            score = fine.score
        );

        // The window may have been shifted to stay inside the source; anchor
        // the coarse offset on the window center the fine offset is measured from.
        let src_cx = half(source.width());
        let src_cy = half(source.height());
        let anchor = coarse_full.translated(
            window.x as f64 + half(window.width) - (coarse_full.x + src_cx),
            window.y as f64 + half(window.height) - (coarse_full.y + src_cy),
        );
        let result = compose_transforms(anchor, fine.shift)?.translated(src_cx, src_cy);
        trace_event!(
            "final_result",
            x = result.x,
            y = result.y,
            angle = result.angle_deg,
            score = fine.score
        );

        if fine.score < score_threshold {
            return Err(RotMatchError::BelowThreshold {
                score: fine.score,
                threshold: score_threshold,
            });
        }

        Ok(MatchReport {
            result,
            coarse: coarse_full,
            fine: fine.shift,
            depth,
            coarse_score: coarse.score,
            fine_score: fine.score,
            window,
            warnings,
        })
    }

    fn coarse_stage(
        &self,
        template: ImageView<'_, u8>,
        source: ImageView<'_, u8>,
        depth: usize,
        max_angle_deg: f64,
        warnings: &mut Vec<ConfigWarning>,
    ) -> RotMatchResult<AngleMatch> {
        let _span = trace_span!("coarse_search", depth = depth).entered();
        let sweep = AngleSweep::new(max_angle_deg, self.cfg.coarse_step_deg)?;
        warnings.extend(sweep.warnings());

        let opts = self.cfg.sweep_options(self.cfg.interpolate_coarse_peaks);
        if depth == 0 {
            let inner = inner_template(template, COARSE_BORDER_BAND)?;
            return match_with_angle(inner, source, &sweep, &opts);
        }
        let coarse_tpl = pyr_down_n(template, depth)?;
        let coarse_src = pyr_down_n(source, depth)?;
        let inner = inner_template(coarse_tpl.view(), COARSE_BORDER_BAND)?;
        match_with_angle(inner, coarse_src.view(), &sweep, &opts)
    }

    fn fine_stage(
        &self,
        template: ImageView<'_, u8>,
        source: ImageView<'_, u8>,
        coarse: ShiftValue,
        warnings: &mut Vec<ConfigWarning>,
    ) -> RotMatchResult<(AngleMatch, Rect)> {
        let cfg = &self.cfg;
        let _span = trace_span!("fine_search", coarse_angle = coarse.angle_deg).entered();

        let rotated = rotate_image(source, coarse.angle_deg)?;
        let center = Point::new(
            coarse.x + half(source.width()),
            coarse.y + half(source.height()),
        );
        let window = window_around(source.size(), template.size(), center, cfg.roi_expand)?;
        let roi = rotated.view().window(window.rect)?;

        let mut tpl_edges = OwnedImage::filled(template.width(), template.height(), 0)?;
        expand_edges(template, &mut tpl_edges, &cfg.edge)?;
        // Sobel reach plus the blur window.
        let band = 1 + cfg.edge.blur_width;
        let tpl_inner = inner_template(tpl_edges.view(), band)?;
        let mut roi_edges = OwnedImage::filled(roi.width(), roi.height(), 0)?;
        expand_edges(roi, &mut roi_edges, &cfg.edge)?;

        let sweep = AngleSweep::new(
            cfg.coarse_step_deg * cfg.fine_range_factor,
            cfg.coarse_step_deg * cfg.fine_step_factor,
        )?;
        warnings.extend(sweep.warnings());
        // The template sits near the window's rotation center, so its
        // sampling phase barely moves with the angle and raw peaks rank fairly.
        let fine = match_with_angle(
            tpl_inner,
            roi_edges.view(),
            &sweep,
            &cfg.sweep_options(false),
        )?;
        Ok((fine, window.rect))
    }
}

/// Drops `band` pixels from every side of `template` when it stays at least
/// twice as large as the dropped border; smaller templates are used whole.
fn inner_template(template: ImageView<'_, u8>, band: usize) -> RotMatchResult<ImageView<'_, u8>> {
    let (width, height) = (template.width(), template.height());
    if band == 0 || width <= 4 * band || height <= 4 * band {
        return Ok(template);
    }
    template.window(Rect::new(band, band, width - 2 * band, height - 2 * band))
}

/// Locates `template` in `source` with the default configuration.
///
/// See [`Matcher::match_template`].
pub fn match_template(
    template: ImageView<'_, u8>,
    source: ImageView<'_, u8>,
    max_angle_deg: f64,
    score_threshold: f32,
) -> RotMatchResult<ShiftValue> {
    Matcher::default().match_template(template, source, max_angle_deg, score_threshold)
}

fn validate_request(
    template: ImageView<'_, u8>,
    source: ImageView<'_, u8>,
    max_angle_deg: f64,
    score_threshold: f32,
) -> RotMatchResult<()> {
    if !template.size().fits_in(source.size()) {
        return Err(RotMatchError::TemplateLargerThanImage {
            tpl_width: template.width(),
            tpl_height: template.height(),
            img_width: source.width(),
            img_height: source.height(),
        });
    }
    if !(0.0..=MAX_ANGLE_DEG).contains(&max_angle_deg) {
        return Err(RotMatchError::AngleOutOfRange {
            angle_deg: max_angle_deg,
            min_deg: 0.0,
            max_deg: MAX_ANGLE_DEG,
        });
    }
    if score_threshold.is_nan() {
        return Err(RotMatchError::InvalidInput("score threshold must not be NaN"));
    }
    Ok(())
}
