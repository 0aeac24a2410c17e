//! CorrPeaks turns dense template-matching score fields into a short list of
//! distinct, high-confidence matches.
//!
//! The core is method-aware candidate extraction: raw scores are mapped to a
//! comparable confidence, up to K peaks are pulled from a working copy of the
//! field with local suppression, and greedy IoU non-maximum suppression keeps
//! the best representative of each cluster. Scalar scoring kernels for the
//! three normalized methods are included, with optional row parallelism via
//! the `rayon` feature and image loading via `image-io`.

mod candidate;
pub mod field;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod method;
pub mod search;
pub mod template;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use candidate::best::find_best;
pub use candidate::nms::deduplicate;
pub use candidate::topk::{extract_topk, SuppressionConfig, TopKExtractor};
pub use candidate::{BBox, Candidate, TemplateSize};
pub use field::ScoreField;
pub use crate::image::{ImageView, OwnedImage, Roi};
pub use kernel::score_field;
pub use method::Method;
pub use search::{translate_to_scene, MatchConfig, MatchOutcome, Matcher};
pub use template::Template;
pub use util::{PeakError, PeakResult};
