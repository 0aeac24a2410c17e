//! Scoring kernels that produce dense score fields.
//!
//! Each normalized method has a zero-sized kernel type implementing
//! [`Kernel`]. Scans evaluate every valid top-left placement of the template,
//! giving a field of `(W - w + 1) x (H - h + 1)` raw scores.

use crate::field::ScoreField;
use crate::image::ImageView;
use crate::method::Method;
use crate::template::TemplatePlan;
use crate::trace::{stage_event, stage_span};
use crate::util::{PeakError, PeakResult};

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;

pub use scalar::{CcoeffNormedScalar, CcorrNormedScalar, SqdiffNormedScalar};

/// Per-placement scoring for one method.
pub trait Kernel {
    /// The method this kernel evaluates.
    const METHOD: Method;

    /// Computes the raw score with the template's top-left corner at `(x, y)`.
    ///
    /// The caller guarantees the placement lies inside the image.
    fn score_at(image: ImageView<'_, u8>, plan: &TemplatePlan, x: usize, y: usize) -> f32;

    /// Fills `out` with scores for row `y` of placements.
    fn score_row(image: ImageView<'_, u8>, plan: &TemplatePlan, y: usize, out: &mut [f32]) {
        for (x, slot) in out.iter_mut().enumerate() {
            *slot = Self::score_at(image, plan, x, y);
        }
    }
}

/// Returns the `(width, height)` of the placement grid.
pub(crate) fn placement_dims(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
) -> PeakResult<(usize, usize)> {
    let (img_width, img_height) = (image.width(), image.height());
    let (tpl_width, tpl_height) = (plan.width(), plan.height());
    if tpl_width > img_width || tpl_height > img_height {
        return Err(PeakError::TemplateLargerThanImage {
            tpl_width,
            tpl_height,
            img_width,
            img_height,
        });
    }
    Ok((img_width - tpl_width + 1, img_height - tpl_height + 1))
}

/// Computes the score field of `template` over `image` for `method`.
pub fn score_field(
    image: ImageView<'_, u8>,
    template: ImageView<'_, u8>,
    method: Method,
) -> PeakResult<ScoreField> {
    let plan = TemplatePlan::from_view(template)?;
    score_field_with_plan(image, &plan, method)
}

/// Computes the score field using a prebuilt template plan.
pub fn score_field_with_plan(
    image: ImageView<'_, u8>,
    plan: &TemplatePlan,
    method: Method,
) -> PeakResult<ScoreField> {
    let _guard = stage_span!(
        "score_field",
        method = method.name(),
        img_width = image.width(),
        img_height = image.height()
    );
    let field = match method {
        Method::SqdiffNormed => scalar::scan_full::<SqdiffNormedScalar>(image, plan)?,
        Method::CcorrNormed => scalar::scan_full::<CcorrNormedScalar>(image, plan)?,
        Method::CcoeffNormed => scalar::scan_full::<CcoeffNormedScalar>(image, plan)?,
    };
    stage_event!(info, "score_field_done", width = field.width(), height = field.height());
    Ok(field)
}
