//! Template storage and planning utilities.

use crate::candidate::TemplateSize;
use crate::image::{ImageView, OwnedImage};
use crate::util::PeakResult;

pub(crate) mod plan;

pub use plan::TemplatePlan;

/// Owned template image in contiguous grayscale format.
pub struct Template {
    img: OwnedImage,
}

impl Template {
    /// Creates a template from a contiguous grayscale buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> PeakResult<Self> {
        let img = OwnedImage::new(data, width, height)?;
        Ok(Self { img })
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }

    /// Returns the template dimensions.
    pub fn size(&self) -> TemplateSize {
        TemplateSize {
            width: self.img.width(),
            height: self.img.height(),
        }
    }
}

impl From<OwnedImage> for Template {
    fn from(img: OwnedImage) -> Self {
        Self { img }
    }
}
