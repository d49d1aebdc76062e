//! Canny edge detection on `u8` images.
//!
//! - 3x3 Sobel derivatives with replicated borders.
//! - L1 magnitude `|gx| + |gy|`.
//! - Non-maximum suppression along one of four quantized directions
//!   (boundaries at 22.5 and 67.5 degrees); magnitudes outside the image count
//!   as zero.
//! - Hysteresis: pixels above `high` seed edges, which grow through
//!   8-connected suppressed maxima above `low`.
//!
//! Edge pixels are written as 255, everything else as 0. [`edge_strength`]
//! runs the same hysteresis without suppression and keeps graded magnitudes.

use crate::image::{ImageView, OwnedImage};
use crate::util::{RotMatchError, RotMatchResult};

const TAN_22_5: f64 = 0.414_213_562_373_095_05;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    None,
    Weak,
    Strong,
}

/// Runs Canny edge detection with integer-truncated thresholds.
///
/// `low` and `high` are swapped when given in the wrong order.
pub fn canny(src: ImageView<'_, u8>, low: f32, high: f32) -> RotMatchResult<OwnedImage> {
    if !low.is_finite() || !high.is_finite() {
        return Err(RotMatchError::InvalidInput("canny thresholds must be finite"));
    }
    let (low, high) = ordered_thresholds(low, high);

    let width = src.width();
    let height = src.height();
    let (gx, gy, mag) = sobel_l1(src)?;

    let mag_at = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
            0
        } else {
            mag[y as usize * width + x as usize]
        }
    };

    let mut marks = vec![Mark::None; width * height];
    let mut stack = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let m = mag[idx];
            if m <= low {
                continue;
            }
            let dx = gx[idx];
            let dy = gy[idx];
            let xs = f64::from(dx.abs());
            let ys = f64::from(dy.abs());
            let tg22x = xs * TAN_22_5;
            let tg67x = tg22x + 2.0 * xs;
            let (xi, yi) = (x as isize, y as isize);

            let is_max = if ys < tg22x {
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else if ys > tg67x {
                m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
            } else {
                let s: isize = if (dx ^ dy) < 0 { -1 } else { 1 };
                m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
            };
            if !is_max {
                continue;
            }
            if m > high {
                marks[idx] = Mark::Strong;
                stack.push((x, y));
            } else {
                marks[idx] = Mark::Weak;
            }
        }
    }

    grow_strong(&mut marks, stack, width, height);

    let data = marks
        .iter()
        .map(|&mark| if mark == Mark::Strong { 255 } else { 0 })
        .collect();
    OwnedImage::new(data, width, height)
}

/// Graded edge map: Sobel L1 magnitude gated by hysteresis.
///
/// Pixels above `high` seed edges that grow through 8-connected pixels above
/// `low`; no non-maximum suppression is applied, so edges keep the width of
/// the gradient response. Kept pixels carry `min(magnitude / 8, 255)`.
pub fn edge_strength(src: ImageView<'_, u8>, low: f32, high: f32) -> RotMatchResult<OwnedImage> {
    if !low.is_finite() || !high.is_finite() {
        return Err(RotMatchError::InvalidInput("edge thresholds must be finite"));
    }
    let (low, high) = ordered_thresholds(low, high);

    let width = src.width();
    let height = src.height();
    let (_, _, mag) = sobel_l1(src)?;

    let mut marks = vec![Mark::None; width * height];
    let mut stack = Vec::new();
    for (idx, &m) in mag.iter().enumerate() {
        if m > high {
            marks[idx] = Mark::Strong;
            stack.push((idx % width, idx / width));
        } else if m > low {
            marks[idx] = Mark::Weak;
        }
    }
    grow_strong(&mut marks, stack, width, height);

    let data = marks
        .iter()
        .zip(&mag)
        .map(|(&mark, &m)| {
            if mark == Mark::Strong {
                (m / 8).min(255) as u8
            } else {
                0
            }
        })
        .collect();
    OwnedImage::new(data, width, height)
}

fn ordered_thresholds(low: f32, high: f32) -> (i32, i32) {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    (low.floor() as i32, high.floor() as i32)
}

/// Promotes weak pixels 8-connected to a strong one, starting from `stack`.
fn grow_strong(marks: &mut [Mark], mut stack: Vec<(usize, usize)>, width: usize, height: usize) {
    while let Some((x, y)) = stack.pop() {
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(height - 1);
        let x0 = x.saturating_sub(1);
        let x1 = (x + 1).min(width - 1);
        for ny in y0..=y1 {
            for nx in x0..=x1 {
                let n = ny * width + nx;
                if marks[n] == Mark::Weak {
                    marks[n] = Mark::Strong;
                    stack.push((nx, ny));
                }
            }
        }
    }
}

type Gradients = (Vec<i32>, Vec<i32>, Vec<i32>);

fn sobel_l1(src: ImageView<'_, u8>) -> RotMatchResult<Gradients> {
    let width = src.width();
    let height = src.height();
    let mut gx = vec![0i32; width * height];
    let mut gy = vec![0i32; width * height];
    let mut mag = vec![0i32; width * height];

    for y in 0..height {
        let rows = [
            src.row_checked(y.saturating_sub(1))?,
            src.row_checked(y)?,
            src.row_checked((y + 1).min(height - 1))?,
        ];
        for x in 0..width {
            let xm = x.saturating_sub(1);
            let xp = (x + 1).min(width - 1);
            let p = |r: usize, c: usize| i32::from(rows[r][c]);
            let sx = (p(0, xp) + 2 * p(1, xp) + p(2, xp)) - (p(0, xm) + 2 * p(1, xm) + p(2, xm));
            let sy = (p(2, xm) + 2 * p(2, x) + p(2, xp)) - (p(0, xm) + 2 * p(0, x) + p(0, xp));
            let idx = y * width + x;
            gx[idx] = sx;
            gy[idx] = sy;
            mag[idx] = sx.abs() + sy.abs();
        }
    }

    Ok((gx, gy, mag))
}

#[cfg(test)]
mod tests {
    use super::{canny, edge_strength};
    use crate::image::ImageView;

    #[test]
    fn vertical_step_yields_single_column_of_edges() {
        let width = 12;
        let height = 8;
        let mut data = vec![0u8; width * height];
        for y in 0..height {
            for x in 6..width {
                data[y * width + x] = 200;
            }
        }
        let view = ImageView::from_slice(&data, width, height).unwrap();
        let edges = canny(view, 50.0, 150.0).unwrap();

        for y in 0..height {
            let row = &edges.data()[y * width..(y + 1) * width];
            let lit: Vec<usize> = (0..width).filter(|&x| row[x] == 255).collect();
            assert_eq!(lit, vec![5], "row {y}");
        }
    }

    #[test]
    fn flat_image_has_no_edges() {
        let data = vec![90u8; 64];
        let view = ImageView::from_slice(&data, 8, 8).unwrap();
        let edges = canny(view, 50.0, 150.0).unwrap();
        assert!(edges.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn strength_keeps_both_sides_of_a_step() {
        let width = 12;
        let height = 6;
        let mut data = vec![0u8; width * height];
        for y in 0..height {
            for x in 6..width {
                data[y * width + x] = 200;
            }
        }
        let view = ImageView::from_slice(&data, width, height).unwrap();
        let edges = edge_strength(view, 50.0, 150.0).unwrap();

        // Columns 5 and 6 both see |gx| = 800; everything else is flat.
        for y in 0..height {
            let row = &edges.data()[y * width..(y + 1) * width];
            let lit: Vec<(usize, u8)> = (0..width)
                .filter(|&x| row[x] > 0)
                .map(|x| (x, row[x]))
                .collect();
            assert_eq!(lit, vec![(5, 100), (6, 100)], "row {y}");
        }
    }

    #[test]
    fn strength_drops_weak_responses_without_a_seed() {
        // A 20-level step gives magnitude 80: above low, below high.
        let mut data = vec![100u8; 64];
        for y in 0..8 {
            for x in 4..8 {
                data[y * 8 + x] = 120;
            }
        }
        let view = ImageView::from_slice(&data, 8, 8).unwrap();
        let edges = edge_strength(view, 50.0, 150.0).unwrap();
        assert!(edges.data().iter().all(|&v| v == 0));
        let seeded = edge_strength(view, 50.0, 70.0).unwrap();
        assert_eq!(seeded.data()[3], 10);
    }
}
