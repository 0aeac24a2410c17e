//! Precomputed template statistics shared by all scoring kernels.

use crate::image::ImageView;
use crate::util::{PeakError, PeakResult};

/// Variance or energy at or below this value is treated as degenerate.
pub(crate) const DEGENERATE_EPS: f64 = 1e-8;

/// Template pixels plus the sums the normalized methods need.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    pixels: Vec<f64>,
    zero_mean: Vec<f64>,
    sum_sq: f64,
    var: f64,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    ///
    /// Flat or all-black templates are accepted; kernels then report the
    /// method's neutral score at every placement.
    pub fn from_view(tpl: ImageView<'_, u8>) -> PeakResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(PeakError::InvalidDimensions { width, height })?;

        let mut pixels = Vec::with_capacity(count);
        for y in 0..height {
            let row = tpl.row(y).ok_or(PeakError::BufferTooSmall {
                needed: (y + 1) * tpl.stride(),
                got: 0,
            })?;
            pixels.extend(row.iter().map(|&v| v as f64));
        }

        let sum: f64 = pixels.iter().sum();
        let sum_sq: f64 = pixels.iter().map(|v| v * v).sum();
        let mean = sum / count as f64;
        let var = (sum_sq - sum * mean).max(0.0);
        let zero_mean = pixels.iter().map(|v| v - mean).collect();

        Ok(Self {
            width,
            height,
            pixels,
            zero_mean,
            sum_sq,
            var,
        })
    }

    /// Returns the template width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the template pixels as `f64`, row-major.
    pub fn pixels(&self) -> &[f64] {
        &self.pixels
    }

    /// Returns the mean-subtracted template.
    pub fn zero_mean(&self) -> &[f64] {
        &self.zero_mean
    }

    /// Returns `Σ T²`.
    pub fn sum_sq(&self) -> f64 {
        self.sum_sq
    }

    /// Returns `Σ (T - mean)²`.
    pub fn var(&self) -> f64 {
        self.var
    }
}
