//! End-to-end matching: score field to final, deduplicated candidates.
//!
//! The pipeline validates its configuration, extracts a pool of
//! `max_results * candidate_multiplier` raw candidates, prunes them with
//! greedy IoU suppression down to `max_results`, and finally shifts them
//! into scene coordinates when a region of interest was searched.

use crate::candidate::best::find_best;
use crate::candidate::nms::deduplicate;
use crate::candidate::topk::{SuppressionConfig, TopKExtractor};
use crate::candidate::{Candidate, TemplateSize};
use crate::field::ScoreField;
use crate::image::{ImageView, Roi};
use crate::kernel::score_field_with_plan;
use crate::method::Method;
use crate::template::TemplatePlan;
use crate::trace::{stage_event, stage_span};
use crate::util::{check_count, check_unit_interval, PeakError, PeakResult};

/// Default multiplier from requested results to the raw candidate pool.
pub const DEFAULT_CANDIDATE_MULTIPLIER: usize = 10;

/// Configuration for [`Matcher`].
#[derive(Clone, Copy, Debug)]
pub struct MatchConfig {
    /// Maximum number of matches returned after NMS.
    pub max_results: usize,
    /// Candidates with lower confidence end extraction.
    pub min_confidence: f32,
    /// Candidates overlapping a kept one at or above this IoU are dropped.
    pub iou_threshold: f32,
    /// Raw pool size is `max_results * candidate_multiplier`.
    pub candidate_multiplier: usize,
    /// Window erased around each extracted peak.
    pub suppression: SuppressionConfig,
    /// Score rows in parallel when the `rayon` feature is enabled.
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            min_confidence: 0.8,
            iou_threshold: 0.3,
            candidate_multiplier: DEFAULT_CANDIDATE_MULTIPLIER,
            suppression: SuppressionConfig::default(),
            parallel: false,
        }
    }
}

impl MatchConfig {
    /// Checks counts and thresholds; nothing is clamped.
    pub fn validate(&self) -> PeakResult<()> {
        check_count("max_results", self.max_results)?;
        check_count("candidate_multiplier", self.candidate_multiplier)?;
        check_count("suppression_divisor", self.suppression.divisor)?;
        check_unit_interval("min_confidence", self.min_confidence)?;
        check_unit_interval("iou_threshold", self.iou_threshold)?;
        Ok(())
    }

    /// Number of raw candidates extracted before NMS.
    pub fn candidate_pool(&self) -> usize {
        self.max_results.saturating_mul(self.candidate_multiplier)
    }
}

/// Result of matching a template against an image.
#[derive(Clone, Debug)]
pub struct MatchOutcome {
    /// Final matches in scene coordinates, best first.
    pub matches: Vec<Candidate>,
    /// Untouched score field (over the ROI when one was given).
    pub field: ScoreField,
    /// Template dimensions.
    pub template: TemplateSize,
    /// Searched region, if any.
    pub roi: Option<Roi>,
}

impl MatchOutcome {
    /// Returns the best match, if any.
    pub fn best(&self) -> Option<&Candidate> {
        self.matches.first()
    }
}

/// Template matcher bound to one scoring method.
#[derive(Clone, Debug)]
pub struct Matcher {
    method: Method,
    cfg: MatchConfig,
}

impl Matcher {
    /// Creates a matcher with default configuration.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            cfg: MatchConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the scoring method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Returns the single best placement on `field` without thresholding.
    pub fn best(&self, field: &ScoreField, template: TemplateSize) -> PeakResult<Candidate> {
        find_best(field, self.method, template)
    }

    /// Runs extraction and NMS on a copy of `field`.
    ///
    /// `field` covers the local search area; when `roi` is given the returned
    /// boxes are shifted by its origin. An empty result means nothing cleared
    /// `min_confidence`.
    pub fn match_field(
        &self,
        field: &ScoreField,
        template: TemplateSize,
        roi: Option<&Roi>,
    ) -> PeakResult<Vec<Candidate>> {
        self.match_field_owned(field.clone(), template, roi)
    }

    /// Like [`Matcher::match_field`] but consumes `field` as the working buffer.
    pub fn match_field_owned(
        &self,
        field: ScoreField,
        template: TemplateSize,
        roi: Option<&Roi>,
    ) -> PeakResult<Vec<Candidate>> {
        self.cfg.validate()?;
        template.validate()?;
        let _guard = stage_span!(
            "match_field",
            method = self.method.name(),
            pool = self.cfg.candidate_pool(),
            max_results = self.cfg.max_results
        );

        let extractor = TopKExtractor::new(self.cfg.candidate_pool(), self.cfg.min_confidence)?
            .with_suppression(self.cfg.suppression)?;
        let raw = extractor.extract(field, self.method, template)?;
        let kept = deduplicate(&raw, self.cfg.iou_threshold, self.cfg.max_results)?;
        let matches = translate_to_scene(kept, roi)?;

        stage_event!(info, "matches", raw = raw.len(), found = matches.len());
        Ok(matches)
    }

    /// Scores `template` over `scene` (restricted to `roi` if given) and matches.
    pub fn match_image(
        &self,
        scene: ImageView<'_, u8>,
        template: ImageView<'_, u8>,
        roi: Option<Roi>,
    ) -> PeakResult<MatchOutcome> {
        self.cfg.validate()?;
        let search = match &roi {
            Some(roi) => scene.crop(roi)?,
            None => scene,
        };
        let plan = TemplatePlan::from_view(template)?;
        let field = self.score(search, &plan)?;
        let size = TemplateSize {
            width: template.width(),
            height: template.height(),
        };
        let matches = self.match_field(&field, size, roi.as_ref())?;
        Ok(MatchOutcome {
            matches,
            field,
            template: size,
            roi,
        })
    }

    fn score(&self, image: ImageView<'_, u8>, plan: &TemplatePlan) -> PeakResult<ScoreField> {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return crate::kernel::rayon::score_field_with_plan_par(image, plan, self.method);
        }
        score_field_with_plan(image, plan, self.method)
    }
}

/// Shifts candidate boxes from ROI-local to scene coordinates.
///
/// Confidence, raw score and order are unchanged; with no ROI this is the
/// identity. Fails with [`PeakError::CoordinateOverflow`] if an origin would
/// not fit in `usize`.
pub fn translate_to_scene(
    candidates: Vec<Candidate>,
    roi: Option<&Roi>,
) -> PeakResult<Vec<Candidate>> {
    let Some(roi) = roi else {
        return Ok(candidates);
    };
    let (dx, dy) = roi.origin();
    candidates
        .into_iter()
        .map(|c| {
            let bbox = c
                .bbox
                .checked_offset(dx, dy)
                .ok_or(PeakError::CoordinateOverflow {
                    x: c.bbox.x,
                    y: c.bbox.y,
                    dx,
                    dy,
                })?;
            Ok(Candidate { bbox, ..c })
        })
        .collect()
}
