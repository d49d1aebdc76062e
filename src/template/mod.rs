//! Template storage and correlation planning.

use crate::geometry::Size;
use crate::image::{ImageView, OwnedImage};
use crate::util::RotMatchResult;

mod plan;

pub use plan::TemplatePlan;

/// Owned template image in contiguous grayscale format.
#[derive(Clone, Debug)]
pub struct Template {
    img: OwnedImage,
}

impl Template {
    /// Creates a template from a contiguous grayscale buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> RotMatchResult<Self> {
        let img = OwnedImage::new(data, width, height)?;
        Ok(Self { img })
    }

    /// Copies a template out of a (possibly strided) view.
    pub fn from_view(view: ImageView<'_, u8>) -> RotMatchResult<Self> {
        Ok(Self {
            img: OwnedImage::from_view(view)?,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// Returns the template size.
    pub fn size(&self) -> Size {
        self.img.size()
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }
}

impl From<OwnedImage> for Template {
    fn from(img: OwnedImage) -> Self {
        Self { img }
    }
}
