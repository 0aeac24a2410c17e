//! Loading scenes and writing score heatmaps via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::field::ScoreField;
use crate::image::OwnedImage;
use crate::method::Method;
use crate::util::{PeakError, PeakResult};
use std::path::Path;

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> PeakResult<OwnedImage> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Loads an image from disk and converts it to 8-bit grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> PeakResult<OwnedImage> {
    let img = image::open(path).map_err(|err| PeakError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_gray_image(&img.to_luma8())
}

/// Maps the field to `0..=255` with min-max normalization, brighter meaning a better match.
///
/// Minimum-seeking methods are flipped first. Flat fields and non-finite
/// samples map to zero.
fn normalized_levels(field: &ScoreField, method: Method) -> Vec<u8> {
    let oriented: Vec<f32> = field
        .data()
        .iter()
        .map(|&v| if method.best_is_minimum() { 1.0 - v } else { v })
        .collect();

    let (lo, hi) = oriented
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = hi - lo;
    oriented
        .iter()
        .map(|&v| {
            if !v.is_finite() || span <= 0.0 {
                0
            } else {
                (((v - lo) / span) * 255.0).round() as u8
            }
        })
        .collect()
}

fn field_dims(field: &ScoreField) -> PeakResult<(u32, u32)> {
    let err = || PeakError::InvalidDimensions {
        width: field.width(),
        height: field.height(),
    };
    let width = u32::try_from(field.width()).map_err(|_| err())?;
    let height = u32::try_from(field.height()).map_err(|_| err())?;
    Ok((width, height))
}

/// Jet colormap: dark blue for the worst score through cyan, yellow, to dark red.
pub fn jet(level: u8) -> image::Rgb<u8> {
    let t = level as f32 / 255.0;
    let channel = |center: f32| ((1.5 - (4.0 * t - center).abs()).clamp(0.0, 1.0) * 255.0).round() as u8;
    image::Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

/// Renders a score field as an 8-bit grayscale image where brighter means a better match.
pub fn heatmap_image(field: &ScoreField, method: Method) -> PeakResult<image::GrayImage> {
    let (width, height) = field_dims(field)?;
    image::GrayImage::from_raw(width, height, normalized_levels(field, method)).ok_or(
        PeakError::BufferSizeMismatch {
            expected: field.width() * field.height(),
            got: field.data().len(),
        },
    )
}

/// Renders a score field through the [`jet`] colormap.
pub fn heatmap_rgb(field: &ScoreField, method: Method) -> PeakResult<image::RgbImage> {
    let (width, height) = field_dims(field)?;
    let levels = normalized_levels(field, method);
    Ok(image::RgbImage::from_fn(width, height, |x, y| {
        jet(levels[y as usize * field.width() + x as usize])
    }))
}

/// Writes [`heatmap_rgb`] to `path`; the format follows the file extension.
pub fn save_heatmap<P: AsRef<Path>>(field: &ScoreField, method: Method, path: P) -> PeakResult<()> {
    heatmap_rgb(field, method)?
        .save(path)
        .map_err(|err| PeakError::ImageIo {
            reason: err.to_string(),
        })
}
