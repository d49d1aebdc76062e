//! Integral tables for constant-time window sums.

use crate::image::ImageView;
use crate::util::RotMatchResult;

/// Summed-area tables of pixel values and squared pixel values.
///
/// Both tables have `(w + 1) x (h + 1)` entries with a zero first row and
/// column, so the sum over `[x, x + w) x [y, y + h)` needs four lookups.
#[derive(Clone, Debug)]
pub struct WindowSums {
    stride: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl WindowSums {
    /// Builds the tables for `image`.
    pub fn new(image: ImageView<'_, u8>) -> RotMatchResult<Self> {
        let width = image.width();
        let height = image.height();
        let stride = width + 1;
        let mut sum = vec![0u64; stride * (height + 1)];
        let mut sum_sq = vec![0u64; stride * (height + 1)];
        for y in 0..height {
            let row = image.row_checked(y)?;
            let mut acc = 0u64;
            let mut acc_sq = 0u64;
            for (x, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                acc += v;
                acc_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + acc;
                sum_sq[idx] = sum_sq[idx - stride] + acc_sq;
            }
        }
        Ok(Self {
            stride,
            sum,
            sum_sq,
        })
    }

    /// Returns `(sum, sum of squares)` over the window at `(x, y)` of size `w x h`.
    #[inline]
    pub fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (u64, u64) {
        let a = y * self.stride + x;
        let b = a + w;
        let c = (y + h) * self.stride + x;
        let d = c + w;
        (
            self.sum[d] + self.sum[a] - self.sum[b] - self.sum[c],
            self.sum_sq[d] + self.sum_sq[a] - self.sum_sq[b] - self.sum_sq[c],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::WindowSums;
    use crate::image::ImageView;

    #[test]
    fn window_sums_match_direct_sums() {
        let data: Vec<u8> = (0u8..20).collect();
        let view = ImageView::from_slice(&data, 5, 4).unwrap();
        let sums = WindowSums::new(view).unwrap();
        let (s, s2) = sums.window(1, 1, 3, 2);
        let expected: Vec<u64> = vec![6, 7, 8, 11, 12, 13];
        assert_eq!(s, expected.iter().sum::<u64>());
        assert_eq!(s2, expected.iter().map(|v| v * v).sum::<u64>());
    }
}
