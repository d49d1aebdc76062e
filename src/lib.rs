//! RotMatch locates a template in a larger grayscale image under rotation.
//!
//! Matching runs coarse-to-fine: an exhaustive angle sweep with normalized
//! cross-correlation over a Gaussian pyramid level, then a narrow fine sweep
//! over edge maps at full resolution inside a window around the coarse
//! estimate. Optional features add angle-parallel sweeps (`rayon`), a
//! vectorized correlation kernel (`simd`), image file I/O (`image-io`), and
//! structured tracing (`tracing`).

pub mod draw;
pub mod edge;
pub mod geometry;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod pipeline;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use crate::image::warp::rotate_image;
pub use crate::image::{ImageView, OwnedImage};
pub use draw::draw_match;
pub use edge::{EdgeConfig, EdgeMode};
pub use geometry::{compose_transforms, rotate_point, Point, Rect, ShiftValue, Size};
pub use pipeline::{match_template, MatchConfig, MatchReport, Matcher};
pub use search::ConfigWarning;
pub use template::Template;
pub use util::{RotMatchError, RotMatchResult};

#[cfg(feature = "image-io")]
pub use crate::image::io;
