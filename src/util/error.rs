//! Error types for rotmatch.

use thiserror::Error;

/// Result alias for rotmatch operations.
pub type RotMatchResult<T> = std::result::Result<T, RotMatchError>;

/// Errors that can occur when running rotmatch algorithms.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RotMatchError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the described image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A window does not fit inside its containing image.
    #[error(
        "roi out of bounds: ({x}, {y}) {width}x{height} in {img_width}x{img_height} image"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// The template exceeds the search image in at least one dimension.
    #[error(
        "template {tpl_width}x{tpl_height} is larger than image {img_width}x{img_height}"
    )]
    TemplateLargerThanImage {
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// An angle lies outside the accepted range.
    #[error("angle {angle_deg} deg outside [{min_deg}, {max_deg}]")]
    AngleOutOfRange {
        angle_deg: f64,
        min_deg: f64,
        max_deg: f64,
    },
    /// Two buffers that must share dimensions do not.
    #[error("size mismatch: {src_width}x{src_height} vs {dst_width}x{dst_height}")]
    SizeMismatch {
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
    },
    /// Template has no usable intensity variation.
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// The best correlation score did not reach the requested threshold.
    #[error("match score {score} below threshold {threshold}")]
    BelowThreshold { score: f32, threshold: f32 },
    /// Image decoding or encoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
