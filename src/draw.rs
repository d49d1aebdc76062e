//! Overlay rendering of a located template footprint.

use crate::geometry::{Point, ShiftValue, Size};
use crate::image::OwnedImage;
use crate::util::RotMatchResult;

const MARKER_RADIUS: i64 = 2;

/// Draws the rotated template outline and its center onto `image`.
///
/// `shift` is a match result in absolute image coordinates. The center and
/// the four corners are marked with small circles and the corners are joined
/// by one-pixel lines in gray level `value`. Pixels outside the image are
/// clipped.
pub fn draw_match(
    image: &mut OwnedImage,
    template: Size,
    shift: ShiftValue,
    value: u8,
) -> RotMatchResult<()> {
    let corners = shift.corners(template)?;
    draw_circle(image, shift.offset(), MARKER_RADIUS, value);
    for corner in corners {
        draw_circle(image, corner, MARKER_RADIUS, value);
    }
    for i in 0..corners.len() {
        draw_line(image, corners[i], corners[(i + 1) % corners.len()], value);
    }
    Ok(())
}

fn pixel(p: Point) -> (i64, i64) {
    (p.x.round() as i64, p.y.round() as i64)
}

/// One-pixel circle outline.
fn draw_circle(image: &mut OwnedImage, center: Point, radius: i64, value: u8) {
    let (cx, cy) = pixel(center);
    let inner = (2 * radius - 1).pow(2);
    let outer = (2 * radius + 1).pow(2);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d2 = 4 * (dx * dx + dy * dy);
            if d2 >= inner && d2 <= outer {
                image.put(cx + dx, cy + dy, value);
            }
        }
    }
}

/// Bresenham line between two points, endpoints included.
fn draw_line(image: &mut OwnedImage, from: Point, to: Point, value: u8) {
    let (mut x, mut y) = pixel(from);
    let (x1, y1) = pixel(to);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        image.put(x, y, value);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{draw_line, draw_match};
    use crate::geometry::{Point, ShiftValue, Size};
    use crate::image::OwnedImage;

    #[test]
    fn line_includes_both_endpoints() {
        let mut img = OwnedImage::filled(10, 10, 0).unwrap();
        draw_line(&mut img, Point::new(1.0, 1.0), Point::new(8.0, 4.0), 255);
        assert_eq!(img.view().get(1, 1), Some(&255));
        assert_eq!(img.view().get(8, 4), Some(&255));
        let lit = img.data().iter().filter(|&&v| v == 255).count();
        assert_eq!(lit, 8);
    }

    #[test]
    fn unrotated_outline_follows_template_edges() {
        let mut img = OwnedImage::filled(40, 40, 0).unwrap();
        draw_match(&mut img, Size::new(10, 20), ShiftValue::new(20.0, 20.0, 0.0), 9).unwrap();
        let view = img.view();
        // Top edge from (15, 10) to (25, 10).
        for x in 15..=25 {
            assert_eq!(view.get(x, 10), Some(&9));
        }
        // Left edge from (15, 10) to (15, 30).
        for y in 10..=30 {
            assert_eq!(view.get(15, y), Some(&9));
        }
        assert_eq!(view.get(20, 25), Some(&0));
    }

    #[test]
    fn drawing_is_clipped_to_the_image() {
        let mut img = OwnedImage::filled(8, 8, 0).unwrap();
        draw_match(&mut img, Size::new(30, 30), ShiftValue::new(4.0, 4.0, 30.0), 1).unwrap();
        assert_eq!(img.data().len(), 64);
    }
}
