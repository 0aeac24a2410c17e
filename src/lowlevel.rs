//! Building blocks for custom pipelines.
//!
//! Most callers only need [`crate::Matcher`]; these exports expose the
//! individual stages and kernels.

pub use crate::candidate::topk::DEFAULT_SUPPRESSION_DIVISOR;
pub use crate::field::FieldPeak;
pub use crate::kernel::scalar::scan_full;
pub use crate::kernel::{
    score_field_with_plan, CcoeffNormedScalar, CcorrNormedScalar, Kernel, SqdiffNormedScalar,
};
pub use crate::search::DEFAULT_CANDIDATE_MULTIPLIER;
pub use crate::template::TemplatePlan;
