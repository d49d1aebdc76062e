//! Grayscale image loading and saving via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Color inputs are
//! converted to 8-bit luma on load.

use crate::image::{ImageView, OwnedImage};
use crate::util::{RotMatchError, RotMatchResult};
use image::GrayImage;
use std::path::Path;

/// Borrows a grayscale image buffer as a view.
pub fn view_from_gray_image(img: &GrayImage) -> RotMatchResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Copies a grayscale image buffer into an owned image.
pub fn owned_from_gray_image(img: &GrayImage) -> RotMatchResult<OwnedImage> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Copies a view into a grayscale image buffer.
pub fn to_gray_image(view: ImageView<'_, u8>) -> RotMatchResult<GrayImage> {
    let width = u32::try_from(view.width()).map_err(|_| RotMatchError::InvalidDimensions {
        width: view.width(),
        height: view.height(),
    })?;
    let height = u32::try_from(view.height()).map_err(|_| RotMatchError::InvalidDimensions {
        width: view.width(),
        height: view.height(),
    })?;
    let mut data = Vec::with_capacity(view.width() * view.height());
    for y in 0..view.height() {
        data.extend_from_slice(view.row_checked(y)?);
    }
    GrayImage::from_raw(width, height, data).ok_or(RotMatchError::BufferTooSmall {
        needed: view.width() * view.height(),
        got: 0,
    })
}

/// Loads an image from disk as 8-bit grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> RotMatchResult<OwnedImage> {
    let img = image::open(path).map_err(|err| RotMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_gray_image(&img.to_luma8())
}

/// Writes a grayscale view to disk; the format follows the file extension.
pub fn save_gray_image<P: AsRef<Path>>(path: P, view: ImageView<'_, u8>) -> RotMatchResult<()> {
    to_gray_image(view)?
        .save(path)
        .map_err(|err| RotMatchError::ImageIo {
            reason: err.to_string(),
        })
}
