//! Expanded search windows around a predicted template center.

use crate::geometry::{Point, Rect, Size};
use crate::util::{RotMatchError, RotMatchResult};

/// Clamped window and its top-left corner in container coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub rect: Rect,
    pub top_left: (usize, usize),
}

/// Computes a window of `reference * (1 + 2 * expand)` centered on `center`.
///
/// The center is truncated to integer pixels. The window is shifted (never
/// shrunk) so that it lies fully inside `container`. The expanded size must not
/// exceed the container; that case is reported as `RoiOutOfBounds`.
pub fn window_around(
    container: Size,
    reference: Size,
    center: Point,
    expand: f64,
) -> RotMatchResult<Window> {
    if !expand.is_finite() || expand < 0.0 {
        return Err(RotMatchError::InvalidInput("expand must be finite and >= 0"));
    }
    if !center.x.is_finite() || !center.y.is_finite() {
        return Err(RotMatchError::InvalidInput("window center must be finite"));
    }

    let cx = center.x.trunc() as i64;
    let cy = center.y.trunc() as i64;
    let img_w = container.width as i64;
    let img_h = container.height as i64;
    if cx < 0 || cy < 0 || cx > img_w || cy > img_h {
        return Err(RotMatchError::InvalidInput(
            "window center lies outside the containing image",
        ));
    }

    let tpl_w = reference.width as f64;
    let tpl_h = reference.height as f64;
    let width = (tpl_w * (1.0 + 2.0 * expand)) as i64;
    let height = (tpl_h * (1.0 + 2.0 * expand)) as i64;
    if width <= 0 || height <= 0 {
        return Err(RotMatchError::InvalidDimensions {
            width: width.max(0) as usize,
            height: height.max(0) as usize,
        });
    }

    let mut x = (cx as f64 - tpl_w * (expand + 0.5)) as i64;
    let mut y = (cy as f64 - tpl_h * (expand + 0.5)) as i64;
    x = x.max(0);
    y = y.max(0);
    if x + width > img_w {
        x = img_w - width;
    }
    if y + height > img_h {
        y = img_h - height;
    }
    if x < 0 || y < 0 {
        return Err(RotMatchError::RoiOutOfBounds {
            x: x.max(0) as usize,
            y: y.max(0) as usize,
            width: width as usize,
            height: height as usize,
            img_width: container.width,
            img_height: container.height,
        });
    }

    let rect = Rect::new(x as usize, y as usize, width as usize, height as usize);
    Ok(Window {
        rect,
        top_left: (rect.x, rect.y),
    })
}

#[cfg(test)]
mod tests {
    use super::window_around;
    use crate::geometry::{Point, Rect, Size};

    #[test]
    fn window_is_centered_when_room_allows() {
        let w = window_around(Size::new(400, 400), Size::new(50, 50), Point::new(145.0, 105.0), 0.2)
            .unwrap();
        assert_eq!(w.rect, Rect::new(110, 70, 70, 70));
        assert_eq!(w.top_left, (110, 70));
    }

    #[test]
    fn window_shifts_at_borders() {
        let size = Size::new(100, 80);
        let w = window_around(size, Size::new(20, 20), Point::new(2.0, 79.0), 0.5).unwrap();
        assert_eq!(w.rect, Rect::new(0, 40, 40, 40));
    }

    #[test]
    fn window_rejects_oversized_expansion() {
        let err = window_around(Size::new(30, 30), Size::new(25, 25), Point::new(15.0, 15.0), 0.2);
        assert!(err.is_err());
    }
}
