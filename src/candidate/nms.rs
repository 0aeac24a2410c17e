//! Greedy IoU non-maximum suppression for candidates.

use crate::candidate::Candidate;
use crate::trace::{stage_event, stage_span};
use crate::util::{check_count, check_unit_interval, PeakResult};

/// Keeps at most `max_keep` mutually non-overlapping candidates.
///
/// Candidates are visited by descending confidence, ties kept in input order.
/// A candidate is kept only if its IoU with every already kept candidate is
/// strictly below `iou_threshold`. The input is not reordered or modified.
pub fn deduplicate(
    candidates: &[Candidate],
    iou_threshold: f32,
    max_keep: usize,
) -> PeakResult<Vec<Candidate>> {
    check_unit_interval("iou_threshold", iou_threshold)?;
    check_count("max_keep", max_keep)?;

    let _guard = stage_span!("deduplicate", input = candidates.len(), max_keep = max_keep);

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    // `sort_by` is stable, so equal confidences keep extraction order.
    order.sort_by(|&a, &b| {
        candidates[b]
            .confidence
            .total_cmp(&candidates[a].confidence)
    });

    let mut kept: Vec<Candidate> = Vec::with_capacity(max_keep.min(candidates.len()));
    'outer: for idx in order {
        let cand = &candidates[idx];
        for kept_cand in kept.iter() {
            if cand.bbox.iou(&kept_cand.bbox) >= iou_threshold {
                continue 'outer;
            }
        }
        kept.push(*cand);
        if kept.len() == max_keep {
            break;
        }
    }

    stage_event!(info, "nms_kept", kept = kept.len(), dropped = candidates.len() - kept.len());
    Ok(kept)
}
