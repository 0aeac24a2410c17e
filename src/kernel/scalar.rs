//! Scalar reference kernels for the normalized methods.
//!
//! Sums are accumulated in `f64` so an exact match scores exactly `0.0`
//! (squared difference) or within rounding of `1.0` (correlations).

use crate::field::ScoreField;
use crate::image::ImageView;
use crate::kernel::{placement_dims, Kernel};
use crate::method::Method;
use crate::template::plan::DEGENERATE_EPS;
use crate::template::TemplatePlan;
use crate::util::PeakResult;

/// Normalized squared difference: `Σ(I - T)² / sqrt(ΣI² · ΣT²)`.
pub struct SqdiffNormedScalar;

/// Normalized cross-correlation: `Σ I·T / sqrt(ΣI² · ΣT²)`.
pub struct CcorrNormedScalar;

/// Normalized correlation coefficient over mean-subtracted image and template.
pub struct CcoeffNormedScalar;

#[inline]
fn window_rows<'a>(
    image: ImageView<'a, u8>,
    plan: &TemplatePlan,
    x: usize,
    y: usize,
) -> impl Iterator<Item = (usize, &'a [u8])> {
    let tpl_width = plan.width();
    (0..plan.height()).filter_map(move |ty| {
        image
            .row(y + ty)
            .and_then(|row| row.get(x..x + tpl_width))
            .map(|row| (ty * tpl_width, row))
    })
}

impl Kernel for SqdiffNormedScalar {
    const METHOD: Method = Method::SqdiffNormed;

    fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        let tpl = plan.pixels();
        let mut ssd = 0.0f64;
        let mut sum_i2 = 0.0f64;
        for (base, row) in window_rows(image, plan, x, y) {
            for (tx, &value) in row.iter().enumerate() {
                let i = value as f64;
                let d = i - tpl[base + tx];
                ssd += d * d;
                sum_i2 += i * i;
            }
        }
        let denom = (sum_i2 * plan.sum_sq()).sqrt();
        if denom <= DEGENERATE_EPS {
            return Self::METHOD.neutral_score();
        }
        (ssd / denom) as f32
    }
}

impl Kernel for CcorrNormedScalar {
    const METHOD: Method = Method::CcorrNormed;

    fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        let tpl = plan.pixels();
        let mut dot = 0.0f64;
        let mut sum_i2 = 0.0f64;
        for (base, row) in window_rows(image, plan, x, y) {
            for (tx, &value) in row.iter().enumerate() {
                let i = value as f64;
                dot += i * tpl[base + tx];
                sum_i2 += i * i;
            }
        }
        let denom = (sum_i2 * plan.sum_sq()).sqrt();
        if denom <= DEGENERATE_EPS {
            return Self::METHOD.neutral_score();
        }
        (dot / denom) as f32
    }
}

impl Kernel for CcoeffNormedScalar {
    const METHOD: Method = Method::CcoeffNormed;

    fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32 {
        let var_t = plan.var();
        if var_t <= DEGENERATE_EPS {
            return Self::METHOD.neutral_score();
        }
        let t_prime = plan.zero_mean();
        let n = (plan.width() * plan.height()) as f64;
        let mut dot = 0.0f64;
        let mut sum_i = 0.0f64;
        let mut sum_i2 = 0.0f64;
        for (base, row) in window_rows(image, plan, x, y) {
            for (tx, &value) in row.iter().enumerate() {
                let i = value as f64;
                dot += i * t_prime[base + tx];
                sum_i += i;
                sum_i2 += i * i;
            }
        }
        let var_i = sum_i2 - sum_i * sum_i / n;
        if var_i <= DEGENERATE_EPS {
            return Self::METHOD.neutral_score();
        }
        (dot / (var_t * var_i).sqrt()) as f32
    }
}

/// Scans every placement row by row on the current thread.
pub fn scan_full<K: Kernel>(image: ImageView<'_, u8>, plan: &TemplatePlan) -> PeakResult<ScoreField> {
    let (width, height) = placement_dims(image, plan)?;
    let mut data = vec![0.0f32; width * height];
    for (y, out) in data.chunks_exact_mut(width).enumerate() {
        K::score_row(image, plan, y, out);
    }
    ScoreField::new(data, width, height)
}
