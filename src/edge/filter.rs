//! Box blur and thresholds.

use crate::image::{ImageView, OwnedImage};
use crate::util::{RotMatchError, RotMatchResult};

/// Normalized box blur with a `ksize x ksize` window.
///
/// The anchor sits at `ksize / 2`, so for even sizes the window covers
/// `[x - ksize / 2, x + ksize - 1 - ksize / 2]`. Borders replicate the nearest
/// pixel; results are rounded to nearest.
pub fn box_blur(src: ImageView<'_, u8>, ksize: usize) -> RotMatchResult<OwnedImage> {
    if ksize == 0 {
        return Err(RotMatchError::InvalidInput("blur width must be >= 1"));
    }
    let width = src.width();
    let height = src.height();
    if ksize == 1 {
        return OwnedImage::from_view(src);
    }

    let anchor = ksize / 2;
    let clamp = |v: isize, len: usize| -> usize { v.clamp(0, len as isize - 1) as usize };

    let mut tmp = vec![0u32; width * height];
    for y in 0..height {
        let row = src.row_checked(y)?;
        for x in 0..width {
            let start = x as isize - anchor as isize;
            let mut acc = 0u32;
            for k in 0..ksize as isize {
                acc += u32::from(row[clamp(start + k, width)]);
            }
            tmp[y * width + x] = acc;
        }
    }

    let area = (ksize * ksize) as u32;
    let mut dst = vec![0u8; width * height];
    for y in 0..height {
        let start = y as isize - anchor as isize;
        for x in 0..width {
            let mut acc = 0u32;
            for k in 0..ksize as isize {
                acc += tmp[clamp(start + k, height) * width + x];
            }
            dst[y * width + x] = ((acc + area / 2) / area) as u8;
        }
    }
    OwnedImage::new(dst, width, height)
}

/// Sets pixels above `cutoff` to `max_value` and all others to zero.
pub fn threshold_binary(
    src: ImageView<'_, u8>,
    cutoff: u8,
    max_value: u8,
) -> RotMatchResult<OwnedImage> {
    let mut data = Vec::with_capacity(src.width() * src.height());
    for y in 0..src.height() {
        data.extend(
            src.row_checked(y)?
                .iter()
                .map(|&v| if v > cutoff { max_value } else { 0 }),
        );
    }
    OwnedImage::new(data, src.width(), src.height())
}

/// Zeroes pixels at or below `cutoff` and caps the rest at `max_value`.
pub fn threshold_to_zero(
    src: ImageView<'_, u8>,
    cutoff: u8,
    max_value: u8,
) -> RotMatchResult<OwnedImage> {
    let mut data = Vec::with_capacity(src.width() * src.height());
    for y in 0..src.height() {
        data.extend(
            src.row_checked(y)?
                .iter()
                .map(|&v| if v > cutoff { v.min(max_value) } else { 0 }),
        );
    }
    OwnedImage::new(data, src.width(), src.height())
}

#[cfg(test)]
mod tests {
    use super::{box_blur, threshold_binary, threshold_to_zero};
    use crate::image::ImageView;

    #[test]
    fn even_blur_spreads_towards_higher_indices() {
        let mut data = vec![0u8; 25];
        data[2 * 5 + 2] = 200;
        let view = ImageView::from_slice(&data, 5, 5).unwrap();
        let out = box_blur(view, 2).unwrap();
        let lit: Vec<(usize, usize)> = (0..25)
            .filter(|&i| out.data()[i] > 0)
            .map(|i| (i % 5, i / 5))
            .collect();
        assert_eq!(lit, vec![(2, 2), (3, 2), (2, 3), (3, 3)]);
        assert_eq!(out.data()[2 * 5 + 2], 50);
    }

    #[test]
    fn threshold_is_strict() {
        let data = [0u8, 1, 2, 255];
        let view = ImageView::from_slice(&data, 4, 1).unwrap();
        let out = threshold_binary(view, 1, 200).unwrap();
        assert_eq!(out.data(), &[0, 0, 200, 200]);
    }

    #[test]
    fn to_zero_keeps_grades_under_the_cap() {
        let data = [0u8, 1, 2, 90, 255];
        let view = ImageView::from_slice(&data, 5, 1).unwrap();
        let out = threshold_to_zero(view, 1, 200).unwrap();
        assert_eq!(out.data(), &[0, 0, 2, 90, 200]);
    }
}
