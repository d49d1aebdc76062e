//! Low-level building blocks for custom matching pipelines.
//!
//! These expose the individual stages used by [`Matcher`](crate::Matcher):
//! pyramid construction, affine warping, edge enhancement, correlation
//! kernels, and the angle-swept matcher. Most users should prefer
//! [`match_template`](crate::match_template).

pub use crate::edge::{
    box_blur, canny, edge_map, edge_strength, expand_edges, threshold_binary, threshold_to_zero,
};
pub use crate::geometry::{window_around, Window};
pub use crate::image::pyramid::{pyr_down, pyr_down_n, pyramid_depth, DEFAULT_MIN_PYRAMID_LEN};
pub use crate::image::warp::{warp_quadrangle, warp_quadrangle_into, AffineMatrix};
pub use crate::kernel::scalar::ZnccScalar;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::ZnccSimd;
pub use crate::kernel::{Kernel, Peak, ScoreMap};
pub use crate::search::{match_with_angle, AngleMatch, AngleSweep, SweepOptions};
pub use crate::template::TemplatePlan;
