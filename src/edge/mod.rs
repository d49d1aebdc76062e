//! Edge enhancement for the fine matching stage.
//!
//! The fine stage correlates edge maps instead of raw intensities, which makes
//! it insensitive to illumination changes between template and scene. Two
//! pipelines are available, selected by [`EdgeMode`]:
//!
//! - `Strength`: hysteresis-gated Sobel magnitude -> box blur -> to-zero
//!   threshold. Edges keep their graded profile, so the correlation peak
//!   narrows smoothly as the fine sweep approaches the true angle.
//! - `Binary`: Canny -> box blur (widens thin edges) -> binary threshold.

mod canny;
mod filter;

pub use canny::{canny, edge_strength};
pub use filter::{box_blur, threshold_binary, threshold_to_zero};

use crate::image::{ImageView, OwnedImage};
use crate::util::{RotMatchError, RotMatchResult};

/// Edge map flavor produced by [`edge_map`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeMode {
    /// Graded edge magnitudes capped at `max_value`.
    #[default]
    Strength,
    /// Thin Canny edges widened and binarized to `max_value`.
    Binary,
}

/// Parameters of the edge enhancement pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeConfig {
    /// Edge map flavor.
    pub mode: EdgeMode,
    /// Hysteresis low threshold on the L1 Sobel magnitude.
    pub low_threshold: f32,
    /// Hysteresis high threshold on the L1 Sobel magnitude.
    pub high_threshold: f32,
    /// Box blur window size in pixels.
    pub blur_width: usize,
    /// Blurred values at or below this become zero.
    pub cutoff: u8,
    /// Output value of binary edge pixels and cap of graded ones.
    pub max_value: u8,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            mode: EdgeMode::default(),
            low_threshold: 50.0,
            high_threshold: 150.0,
            blur_width: 3,
            cutoff: 0,
            max_value: 200,
        }
    }
}

impl EdgeConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> RotMatchResult<()> {
        if !self.low_threshold.is_finite() || !self.high_threshold.is_finite() {
            return Err(RotMatchError::InvalidInput("edge thresholds must be finite"));
        }
        if self.low_threshold < 0.0 || self.high_threshold < 0.0 {
            return Err(RotMatchError::InvalidInput("edge thresholds must be >= 0"));
        }
        if self.blur_width == 0 {
            return Err(RotMatchError::InvalidInput("blur_width must be >= 1"));
        }
        if self.max_value == 0 {
            return Err(RotMatchError::InvalidInput("max_value must be > 0"));
        }
        Ok(())
    }
}

/// Writes the edge-enhanced version of `src` into `dst`.
///
/// Both buffers must share dimensions.
pub fn expand_edges(
    src: ImageView<'_, u8>,
    dst: &mut OwnedImage,
    cfg: &EdgeConfig,
) -> RotMatchResult<()> {
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(RotMatchError::SizeMismatch {
            src_width: src.width(),
            src_height: src.height(),
            dst_width: dst.width(),
            dst_height: dst.height(),
        });
    }
    let edges = edge_map(src, cfg)?;
    dst.data_mut().copy_from_slice(edges.data());
    Ok(())
}

/// Returns the edge-enhanced version of `src` as a new image.
pub fn edge_map(src: ImageView<'_, u8>, cfg: &EdgeConfig) -> RotMatchResult<OwnedImage> {
    cfg.validate()?;
    match cfg.mode {
        EdgeMode::Strength => {
            let edges = edge_strength(src, cfg.low_threshold, cfg.high_threshold)?;
            let blurred = box_blur(edges.view(), cfg.blur_width)?;
            threshold_to_zero(blurred.view(), cfg.cutoff, cfg.max_value)
        }
        EdgeMode::Binary => {
            let edges = canny(src, cfg.low_threshold, cfg.high_threshold)?;
            let blurred = box_blur(edges.view(), cfg.blur_width)?;
            threshold_binary(blurred.view(), cfg.cutoff, cfg.max_value)
        }
    }
}
