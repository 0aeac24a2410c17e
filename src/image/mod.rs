//! Image views and regions of interest.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! Cropping to a [`Roi`] is zero-copy and keeps the parent stride, so scoring
//! a sub-rectangle never duplicates pixels.

use crate::util::{PeakError, PeakResult};
use std::str::FromStr;

#[cfg(feature = "image-io")]
pub mod io;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> PeakResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> PeakResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(PeakError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }

    /// Returns a zero-copy view of `roi`, which must lie inside the image.
    pub fn crop(&self, roi: &Roi) -> PeakResult<ImageView<'a, T>> {
        roi.check_within(self.width, self.height)?;
        let start = roi.y * self.stride + roi.x;
        let data = self.data.get(start..).ok_or(PeakError::BufferTooSmall {
            needed: start.saturating_add(1),
            got: self.data.len(),
        })?;
        ImageView::new(data, roi.width, roi.height, self.stride)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> PeakResult<usize> {
    if width == 0 || height == 0 {
        return Err(PeakError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(PeakError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(PeakError::InvalidDimensions { width, height })
}

/// Owned contiguous grayscale image.
#[derive(Clone, Debug)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a contiguous buffer of exactly `width * height` pixels.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> PeakResult<Self> {
        if width == 0 || height == 0 {
            return Err(PeakError::InvalidDimensions { width, height });
        }
        let expected = width
            .checked_mul(height)
            .ok_or(PeakError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(PeakError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

/// Rectangular region of interest in scene coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Roi {
    /// Left edge.
    pub x: usize,
    /// Top edge.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Roi {
    /// Creates a region.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner added to local coordinates to reach scene coordinates.
    pub fn origin(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Fails unless the region is non-empty and inside a `img_width x img_height` image.
    pub fn check_within(&self, img_width: usize, img_height: usize) -> PeakResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PeakError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let fits = self
            .x
            .checked_add(self.width)
            .is_some_and(|end| end <= img_width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|end| end <= img_height);
        if !fits {
            return Err(PeakError::RoiOutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                img_width,
                img_height,
            });
        }
        Ok(())
    }
}

impl FromStr for Roi {
    type Err = PeakError;

    /// Parses `x,y,w,h` with non-negative integers and positive size.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PeakError::InvalidRoiSpec { spec: s.to_owned() };
        let parts: Vec<usize> = s
            .split(',')
            .map(|p| p.trim().parse::<usize>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        match parts[..] {
            [x, y, width, height] if width > 0 && height > 0 => {
                Ok(Roi::new(x, y, width, height))
            }
            _ => Err(invalid()),
        }
    }
}
