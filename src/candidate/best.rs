//! Single best-match lookup.

use crate::candidate::{Candidate, TemplateSize};
use crate::field::ScoreField;
use crate::method::Method;
use crate::util::{PeakError, PeakResult};

/// Returns the globally best placement on `field` for `method`.
///
/// The field is not modified. Ties resolve to the first location in row-major
/// order. Fails with [`PeakError::EmptyField`] when the field holds no
/// comparable (non-NaN) sample.
pub fn find_best(
    field: &ScoreField,
    method: Method,
    template: TemplateSize,
) -> PeakResult<Candidate> {
    template.validate()?;
    let peak = field.best_loc(method).ok_or(PeakError::EmptyField)?;
    Ok(Candidate {
        bbox: template.bbox_at(peak.x, peak.y),
        raw_score: peak.value,
        confidence: method.confidence(peak.value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_minimum_for_sqdiff_and_maximum_otherwise() {
        let field = ScoreField::new(vec![0.4, 0.1, 0.8, 0.3, 0.9, 0.2], 3, 2).unwrap();
        let tpl = TemplateSize::new(5, 4).unwrap();

        let best = find_best(&field, Method::SqdiffNormed, tpl).unwrap();
        assert_eq!((best.bbox.x, best.bbox.y), (1, 0));
        assert_eq!((best.bbox.width, best.bbox.height), (5, 4));
        assert!((best.confidence - 0.9).abs() < 1e-6);

        let best = find_best(&field, Method::CcorrNormed, tpl).unwrap();
        assert_eq!((best.bbox.x, best.bbox.y), (1, 1));
        assert_eq!(best.raw_score, 0.9);
    }

    #[test]
    fn does_not_mutate_field() {
        let field = ScoreField::new(vec![0.1, 0.7, 0.3, 0.2], 2, 2).unwrap();
        let before = field.clone();
        let _ = find_best(&field, Method::CcoeffNormed, TemplateSize::new(2, 2).unwrap());
        assert_eq!(field, before);
    }

    #[test]
    fn all_nan_field_is_rejected() {
        let field = ScoreField::filled(2, 2, f32::NAN).unwrap();
        let err = find_best(&field, Method::CcorrNormed, TemplateSize::new(1, 1).unwrap());
        assert_eq!(err, Err(PeakError::EmptyField));
    }
}
