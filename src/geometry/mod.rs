//! Rigid 2D geometry used to carry match results between stages.
//!
//! A [`ShiftValue`] is a rotation followed by a translation. Its `x`/`y` are
//! measured in the frame *after* the search image was rotated by `angle_deg`,
//! relative to that image's center. [`rotate_point`] maps such an offset back
//! into the unrotated frame, and [`compose_transforms`] chains the coarse and
//! fine stage results.
//!
//! Sign convention: `rotate_point` uses
//! `x' = cos(a) x + sin(a) y`, `y' = -sin(a) x + cos(a) y`, the same matrix the
//! warp applies to destination offsets when it samples the source.

mod roi;

pub use roi::{window_around, Window};

use crate::util::math::{sin_cos_deg, wrap_deg};
use crate::util::{RotMatchError, RotMatchResult};

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Returns true when `self` fits inside `other` in both dimensions.
    pub fn fits_in(&self, other: Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

/// Point in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned window inside an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the window size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns true when the window lies fully inside an image of `size`.
    pub fn is_inside(&self, size: Size) -> bool {
        self.x + self.width <= size.width && self.y + self.height <= size.height
    }
}

/// Rigid transform estimate: rotation in degrees, then translation in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShiftValue {
    pub x: f64,
    pub y: f64,
    pub angle_deg: f64,
}

impl ShiftValue {
    /// The identity transform.
    pub const IDENTITY: ShiftValue = ShiftValue {
        x: 0.0,
        y: 0.0,
        angle_deg: 0.0,
    };

    pub const fn new(x: f64, y: f64, angle_deg: f64) -> Self {
        Self { x, y, angle_deg }
    }

    /// Returns the translation as a point.
    pub fn offset(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns a copy with the translation shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.angle_deg)
    }

    /// Returns the four corners of a template of `size` placed at this transform.
    ///
    /// Corners are ordered top-left, top-right, bottom-right, bottom-left and
    /// are rotated about the translation point with [`rotate_point`].
    pub fn corners(&self, size: Size) -> RotMatchResult<[Point; 4]> {
        let hw = size.width as f64 / 2.0;
        let hh = size.height as f64 / 2.0;
        let local = [
            Point::new(-hw, -hh),
            Point::new(hw, -hh),
            Point::new(hw, hh),
            Point::new(-hw, hh),
        ];
        let angle = wrap_deg(self.angle_deg);
        let mut out = [Point::default(); 4];
        for (dst, corner) in out.iter_mut().zip(local) {
            let rotated = rotate_point(corner, angle)?;
            *dst = Point::new(rotated.x + self.x, rotated.y + self.y);
        }
        Ok(out)
    }
}

/// Rotates `p` about the origin by `angle_deg` in `[-180, 180]`.
///
/// An angle of exactly zero returns `p` unchanged.
pub fn rotate_point(p: Point, angle_deg: f64) -> RotMatchResult<Point> {
    if !(-180.0..=180.0).contains(&angle_deg) {
        return Err(RotMatchError::AngleOutOfRange {
            angle_deg,
            min_deg: -180.0,
            max_deg: 180.0,
        });
    }
    if angle_deg == 0.0 {
        return Ok(p);
    }
    let (sin, cos) = sin_cos_deg(angle_deg);
    Ok(Point::new(cos * p.x + sin * p.y, -sin * p.x + cos * p.y))
}

/// Chains `second`, measured in the frame already rotated by `first`, after `first`.
///
/// The first translation is rotated by the first angle, the second translation
/// by the sum of both angles; translations and angles are then summed. Angle
/// sums beyond ±180 are wrapped before rotating; the returned angle is the
/// plain sum.
pub fn compose_transforms(first: ShiftValue, second: ShiftValue) -> RotMatchResult<ShiftValue> {
    let a = rotate_point(first.offset(), wrap_deg(first.angle_deg))?;
    let sum_angle = first.angle_deg + second.angle_deg;
    let b = rotate_point(second.offset(), wrap_deg(sum_angle))?;
    Ok(ShiftValue::new(a.x + b.x, a.y + b.y, sum_angle))
}
