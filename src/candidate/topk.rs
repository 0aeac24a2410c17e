//! Iterative top-K extraction with local suppression.
//!
//! Each round takes the global extremum of a private working field, accepts it
//! if its confidence clears the threshold, then overwrites a window around it
//! with the method's worst raw value so the same peak is not found again.

use crate::candidate::{Candidate, TemplateSize};
use crate::field::ScoreField;
use crate::method::Method;
use crate::trace::{stage_event, stage_span};
use crate::util::{check_count, check_unit_interval, PeakResult};

/// Default divisor applied to template dimensions to get the suppression half-extent.
pub const DEFAULT_SUPPRESSION_DIVISOR: usize = 4;

/// Size of the window erased around each accepted peak.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuppressionConfig {
    /// Half-extent is `max(1, template_dim / divisor)` on each axis.
    pub divisor: usize,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_SUPPRESSION_DIVISOR,
        }
    }
}

impl SuppressionConfig {
    /// Returns the half-extent `(rx, ry)`, each at least one.
    pub fn half_extent(&self, template: TemplateSize) -> (usize, usize) {
        let divisor = self.divisor.max(1);
        (
            (template.width / divisor).max(1),
            (template.height / divisor).max(1),
        )
    }
}

/// Extracts up to `k` candidates by repeated extremum search and suppression.
#[derive(Clone, Copy, Debug)]
pub struct TopKExtractor {
    k: usize,
    min_confidence: f32,
    suppression: SuppressionConfig,
}

impl TopKExtractor {
    /// Creates an extractor; fails if `k < 1` or `min_confidence` is outside `[0, 1]`.
    pub fn new(k: usize, min_confidence: f32) -> PeakResult<Self> {
        check_count("k", k)?;
        check_unit_interval("min_confidence", min_confidence)?;
        Ok(Self {
            k,
            min_confidence,
            suppression: SuppressionConfig::default(),
        })
    }

    /// Replaces the suppression window configuration.
    pub fn with_suppression(mut self, suppression: SuppressionConfig) -> PeakResult<Self> {
        check_count("suppression_divisor", suppression.divisor)?;
        self.suppression = suppression;
        Ok(self)
    }

    /// Maximum number of candidates returned.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Runs extraction on a field the extractor owns and may overwrite.
    ///
    /// Candidates come back in extraction order, which is non-increasing in
    /// confidence. Suppressed cells hold the method's sentinel and are never
    /// selected again. Extraction stops early when the best remaining confidence
    /// is below the threshold or every location has been suppressed.
    pub fn extract(
        &self,
        mut work: ScoreField,
        method: Method,
        template: TemplateSize,
    ) -> PeakResult<Vec<Candidate>> {
        template.validate()?;
        let _guard = stage_span!(
            "extract_topk",
            k = self.k,
            method = method.name(),
            width = work.width(),
            height = work.height()
        );

        let (rx, ry) = self.suppression.half_extent(template);
        let sentinel = method.worst_sentinel();
        let mut suppressed = vec![false; work.width() * work.height()];
        let mut hits = Vec::with_capacity(self.k.min(suppressed.len()));

        for round in 0..self.k {
            let Some(peak) = work.best_loc_excluding(method, &suppressed) else {
                stage_event!(info, "topk_stop", round = round, reason = "exhausted");
                break;
            };

            let confidence = method.confidence(peak.value);
            if confidence < self.min_confidence {
                stage_event!(info, "topk_stop", round = round, reason = "below_threshold");
                break;
            }
            hits.push(Candidate {
                bbox: template.bbox_at(peak.x, peak.y),
                raw_score: peak.value,
                confidence,
            });
            stage_event!(
                debug,
                "topk_round",
                round = round,
                x = peak.x,
                y = peak.y,
                confidence = confidence
            );

            let x0 = peak.x.saturating_sub(rx);
            let y0 = peak.y.saturating_sub(ry);
            let x1 = (peak.x + rx).min(work.width() - 1);
            let y1 = (peak.y + ry).min(work.height() - 1);
            work.fill_rect(x0, y0, x1, y1, sentinel);
            for y in y0..=y1 {
                let start = y * work.width();
                suppressed[start + x0..=start + x1].fill(true);
            }
        }

        stage_event!(info, "topk_candidates", count = hits.len());
        Ok(hits)
    }
}

/// Extracts up to `k` candidates from a copy of `field` using the default suppression window.
///
/// The caller's field is left untouched.
pub fn extract_topk(
    field: &ScoreField,
    method: Method,
    template: TemplateSize,
    k: usize,
    min_confidence: f32,
) -> PeakResult<Vec<Candidate>> {
    TopKExtractor::new(k, min_confidence)?.extract(field.clone(), method, template)
}
