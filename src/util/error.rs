//! Error types for corrpeaks.

use thiserror::Error;

/// Result alias for corrpeaks operations.
pub type PeakResult<T> = std::result::Result<T, PeakError>;

/// Errors raised when inputs to extraction or scoring are invalid.
///
/// An empty candidate list is a valid result and never maps to an error.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PeakError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// An owned buffer does not hold exactly `width * height` samples.
    #[error("buffer size mismatch: expected {expected}, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },
    /// The score field holds no samples.
    #[error("score field is empty")]
    EmptyField,
    /// Template dimensions must both be positive.
    #[error("invalid template size: {width}x{height}")]
    InvalidTemplateSize { width: usize, height: usize },
    /// A count parameter (`k`, `max_keep`, ...) is below one.
    #[error("{name} must be at least 1, got {value}")]
    InvalidCount { name: &'static str, value: usize },
    /// A threshold lies outside `[0, 1]` or is not finite.
    #[error("{name} must lie in [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },
    /// The region of interest does not fit inside the scene.
    #[error("roi {x},{y} {width}x{height} out of bounds for {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Shifting a box into scene coordinates overflowed.
    #[error("box at {x},{y} cannot be offset by {dx},{dy}")]
    CoordinateOverflow {
        x: usize,
        y: usize,
        dx: usize,
        dy: usize,
    },
    /// The template does not fit inside the searched image.
    #[error("template larger than scene (templ: {tpl_width}x{tpl_height}, scene: {img_width}x{img_height})")]
    TemplateLargerThanImage {
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// The method name is not one of the supported variants.
    #[error("unknown method '{name}' (expected ccoeff_normed|ccorr_normed|sqdiff_normed)")]
    UnknownMethod { name: String },
    /// The region of interest string is not `x,y,w,h`.
    #[error("invalid roi '{spec}' (expected x,y,w,h)")]
    InvalidRoiSpec { spec: String },
    /// Image decoding or encoding failed.
    #[cfg(feature = "image-io")]
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}

/// Rejects values outside `[0, 1]`, including NaN.
pub(crate) fn check_unit_interval(name: &'static str, value: f32) -> PeakResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PeakError::ThresholdOutOfRange { name, value })
    }
}

/// Rejects counts below one.
pub(crate) fn check_count(name: &'static str, value: usize) -> PeakResult<()> {
    if value == 0 {
        return Err(PeakError::InvalidCount { name, value });
    }
    Ok(())
}
