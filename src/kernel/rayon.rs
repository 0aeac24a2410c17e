//! Row-parallel scans (feature-gated).
//!
//! Rows of the placement grid are scored independently with the same
//! per-row routine as the scalar scan, so results are bit-identical.

use crate::field::ScoreField;
use crate::image::ImageView;
use crate::kernel::{
    placement_dims, CcoeffNormedScalar, CcorrNormedScalar, Kernel, SqdiffNormedScalar,
};
use crate::method::Method;
use crate::template::TemplatePlan;
use crate::trace::stage_span;
use crate::util::PeakResult;
use rayon::prelude::*;

/// Scans every placement, distributing rows across the rayon pool.
pub fn scan_full_par<K: Kernel>(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
) -> PeakResult<ScoreField> {
    let (width, height) = placement_dims(image, plan)?;
    let mut data = vec![0.0f32; width * height];
    data.par_chunks_exact_mut(width)
        .enumerate()
        .for_each(|(y, out)| K::score_row(image, plan, y, out));
    ScoreField::new(data, width, height)
}

/// Parallel counterpart of [`crate::kernel::score_field`].
pub fn score_field_par(
    image: ImageView<'_, u8>,
    template: ImageView<'_, u8>,
    method: Method,
) -> PeakResult<ScoreField> {
    let plan = TemplatePlan::from_view(template)?;
    score_field_with_plan_par(image, &plan, method)
}

/// Parallel counterpart of [`crate::kernel::score_field_with_plan`].
pub fn score_field_with_plan_par(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    method: Method,
) -> PeakResult<ScoreField> {
    let _guard = stage_span!("score_field", method = method.name(), parallel = true);
    match method {
        Method::SqdiffNormed => scan_full_par::<SqdiffNormedScalar>(image, plan),
        Method::CcorrNormed => scan_full_par::<CcorrNormedScalar>(image, plan),
        Method::CcoeffNormed => scan_full_par::<CcoeffNormedScalar>(image, plan),
    }
}
