//! Pyramid depth selection and Gaussian 2x downsampling for `u8` images.
//!
//! Each level applies a separable 5-tap Gaussian (`[1, 4, 6, 4, 1] / 16`) with
//! replicated borders and keeps every other pixel, so a `w x h` image becomes
//! `floor(w / 2) x floor(h / 2)`. Rounding uses integer arithmetic:
//! `dst = (sum + 128) >> 8`.

use crate::geometry::Size;
use crate::image::{ImageView, OwnedImage};
use crate::util::{RotMatchError, RotMatchResult};

/// Default minimum template dimension kept at the coarse level.
pub const DEFAULT_MIN_PYRAMID_LEN: usize = 20;

/// Chooses how many times the template may be halved before the coarse search.
///
/// The count stops as soon as the halved template is no longer strictly larger
/// than `min_len` or no longer strictly smaller than the source, then one level
/// is given back so the coarse template keeps some detail. Returns 0 when the
/// template already shares a dimension with the source or is at or below
/// `min_len`.
pub fn pyramid_depth(template: Size, source: Size, min_len: usize) -> RotMatchResult<usize> {
    if !template.fits_in(source) {
        return Err(RotMatchError::TemplateLargerThanImage {
            tpl_width: template.width,
            tpl_height: template.height,
            img_width: source.width,
            img_height: source.height,
        });
    }

    if template.width == source.width
        || template.height == source.height
        || template.width <= min_len
        || template.height <= min_len
    {
        return Ok(0);
    }

    let mut size = template;
    let mut count = 0usize;
    while size.width < source.width
        && size.height < source.height
        && size.width > min_len
        && size.height > min_len
    {
        size.width /= 2;
        size.height /= 2;
        count += 1;
    }

    Ok(count.saturating_sub(1))
}

/// Applies one Gaussian blur + 2x decimation step.
pub fn pyr_down(src: ImageView<'_, u8>) -> RotMatchResult<OwnedImage> {
    let width = src.width();
    let height = src.height();
    let dst_width = width / 2;
    let dst_height = height / 2;
    if dst_width == 0 || dst_height == 0 {
        return Err(RotMatchError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }

    // Horizontal pass on every source row, only at even columns.
    let mut tmp = vec![0u16; dst_width * height];
    for y in 0..height {
        let row = src.row_checked(y)?;
        let out = &mut tmp[y * dst_width..(y + 1) * dst_width];
        for (dx, value) in out.iter_mut().enumerate() {
            let x = dx * 2;
            let xm2 = x.saturating_sub(2);
            let xm1 = x.saturating_sub(1);
            let xp1 = (x + 1).min(width - 1);
            let xp2 = (x + 2).min(width - 1);
            *value = u16::from(row[xm2])
                + 4 * u16::from(row[xm1])
                + 6 * u16::from(row[x])
                + 4 * u16::from(row[xp1])
                + u16::from(row[xp2]);
        }
    }

    let mut dst = vec![0u8; dst_width * dst_height];
    for dy in 0..dst_height {
        let y = dy * 2;
        let rows = [
            y.saturating_sub(2),
            y.saturating_sub(1),
            y,
            (y + 1).min(height - 1),
            (y + 2).min(height - 1),
        ];
        let weights = [1u32, 4, 6, 4, 1];
        for dx in 0..dst_width {
            let mut sum = 0u32;
            for (&ry, &w) in rows.iter().zip(weights.iter()) {
                sum += w * u32::from(tmp[ry * dst_width + dx]);
            }
            dst[dy * dst_width + dx] = ((sum + 128) >> 8) as u8;
        }
    }

    OwnedImage::new(dst, dst_width, dst_height)
}

/// Downsamples `src` `depth` times in sequence.
///
/// Intermediate levels are dropped as soon as the next one exists; only the
/// final level is returned. `depth` must be at least 1.
pub fn pyr_down_n(src: ImageView<'_, u8>, depth: usize) -> RotMatchResult<OwnedImage> {
    if depth < 1 {
        return Err(RotMatchError::InvalidInput("pyramid depth must be >= 1"));
    }
    let mut level = pyr_down(src)?;
    for _ in 1..depth {
        level = pyr_down(level.view())?;
    }
    Ok(level)
}
