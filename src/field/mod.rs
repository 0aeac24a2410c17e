//! Dense score fields produced by template scoring.
//!
//! A `ScoreField` stores one similarity value per template placement in
//! row-major order. Extraction routines treat it as read-only except for the
//! working copy owned by top-K extraction.

use crate::method::Method;
use crate::util::{PeakError, PeakResult};

/// Location and raw value of a field extremum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldPeak {
    /// Column of the sample.
    pub x: usize,
    /// Row of the sample.
    pub y: usize,
    /// Raw score at `(x, y)`.
    pub value: f32,
}

/// Owned row-major 2D array of similarity scores.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreField {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl ScoreField {
    /// Wraps `data` as a `width x height` field.
    ///
    /// The buffer must hold exactly `width * height` samples.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> PeakResult<Self> {
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

    /// Creates a field filled with `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> PeakResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(PeakError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }

    /// Returns the field width (number of columns).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the field height (number of rows).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the samples in row-major order.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the field and returns its buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Returns the sample at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Overwrites the sample at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[f32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Fills the inclusive rectangle `[x0, x1] x [y0, y1]`, clipped to the field.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, value: f32) {
        if x0 >= self.width || y0 >= self.height {
            return;
        }
        let x1 = x1.min(self.width - 1);
        let y1 = y1.min(self.height - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }
        for y in y0..=y1 {
            let start = y * self.width;
            self.data[start + x0..=start + x1].fill(value);
        }
    }

    /// Returns the first minimum in row-major order, skipping NaN samples.
    pub fn min_loc(&self) -> Option<FieldPeak> {
        self.scan_extremum(|a, b| a < b)
    }

    /// Returns the first maximum in row-major order, skipping NaN samples.
    pub fn max_loc(&self) -> Option<FieldPeak> {
        self.scan_extremum(|a, b| a > b)
    }

    /// Returns the best sample for `method`.
    pub fn best_loc(&self, method: Method) -> Option<FieldPeak> {
        self.scan_extremum(|a, b| method.is_better(a, b))
    }

    /// Returns the best sample for `method` among cells where `excluded` is false.
    ///
    /// `excluded` is indexed like [`ScoreField::data`]; `None` means every
    /// remaining cell is excluded or NaN.
    pub(crate) fn best_loc_excluding(
        &self,
        method: Method,
        excluded: &[bool],
    ) -> Option<FieldPeak> {
        self.scan_extremum_masked(|a, b| method.is_better(a, b), Some(excluded))
    }

    fn scan_extremum(&self, better: impl Fn(f32, f32) -> bool) -> Option<FieldPeak> {
        self.scan_extremum_masked(better, None)
    }

    fn scan_extremum_masked(
        &self,
        better: impl Fn(f32, f32) -> bool,
        excluded: Option<&[bool]>,
    ) -> Option<FieldPeak> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, &value) in self.data.iter().enumerate() {
            if value.is_nan() {
                continue;
            }
            if excluded.is_some_and(|mask| mask.get(idx).copied().unwrap_or(false)) {
                continue;
            }
            match best {
                Some((_, current)) if !better(value, current) => {}
                _ => best = Some((idx, value)),
            }
        }
        best.map(|(idx, value)| FieldPeak {
            x: idx % self.width,
            y: idx / self.width,
            value,
        })
    }
}
