//! Candidate extraction and pruning.
//!
//! Covers single best-match lookup, iterative top-K extraction with local
//! suppression, and greedy IoU non-maximum suppression.

pub(crate) mod best;
pub(crate) mod nms;
pub(crate) mod topk;

use crate::util::{PeakError, PeakResult};

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BBox {
    /// Left edge.
    pub x: usize,
    /// Top edge.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl BBox {
    /// Creates a rectangle.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the area in pixels.
    pub fn area(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Returns the overlap area with `other`, zero when disjoint.
    pub fn intersection_area(&self, other: &BBox) -> usize {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self
            .x
            .saturating_add(self.width)
            .min(other.x.saturating_add(other.width));
        let y1 = self
            .y
            .saturating_add(self.height)
            .min(other.y.saturating_add(other.height));
        if x1 <= x0 || y1 <= y0 {
            return 0;
        }
        (x1 - x0) * (y1 - y0)
    }

    /// Intersection over union with `other`, `0.0` when disjoint or degenerate.
    pub fn iou(&self, other: &BBox) -> f32 {
        let inter = self.intersection_area(other);
        if inter == 0 {
            return 0.0;
        }
        let inter = inter as f64;
        let union = self.area() as f64 + other.area() as f64 - inter;
        if union <= 0.0 {
            return 0.0;
        }
        (inter / union) as f32
    }

    /// Returns the rectangle shifted by `(dx, dy)`, or `None` on overflow.
    pub fn checked_offset(self, dx: usize, dy: usize) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            ..self
        })
    }
}

/// Template dimensions; every candidate bbox has this size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateSize {
    /// Template width in pixels.
    pub width: usize,
    /// Template height in pixels.
    pub height: usize,
}

impl TemplateSize {
    /// Creates a template size, rejecting zero dimensions.
    pub fn new(width: usize, height: usize) -> PeakResult<Self> {
        let size = Self { width, height };
        size.validate()?;
        Ok(size)
    }

    pub(crate) fn validate(&self) -> PeakResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PeakError::InvalidTemplateSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub(crate) fn bbox_at(&self, x: usize, y: usize) -> BBox {
        BBox::new(x, y, self.width, self.height)
    }
}

/// A located match with its raw score and normalized confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Template placement; size always equals the template size.
    pub bbox: BBox,
    /// Method-native score at the placement.
    pub raw_score: f32,
    /// Raw score mapped into `[0, 1]`.
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = BBox::new(3, 4, 10, 10);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_or_touching_boxes_is_zero() {
        let a = BBox::new(0, 0, 10, 10);
        assert_eq!(a.iou(&BBox::new(50, 0, 10, 10)), 0.0);
        assert_eq!(a.iou(&BBox::new(10, 0, 10, 10)), 0.0);
    }

    #[test]
    fn iou_matches_hand_computed_overlap() {
        let a = BBox::new(0, 0, 10, 10);
        let b = BBox::new(3, 0, 10, 10);
        // 70 / (100 + 100 - 70)
        assert!((a.iou(&b) - 70.0 / 130.0).abs() < 1e-6);
        assert_eq!(a.iou(&b), b.iou(&a));
    }

    #[test]
    fn zero_area_boxes_never_overlap() {
        let a = BBox::new(0, 0, 0, 10);
        assert_eq!(a.iou(&a), 0.0);
    }

    #[test]
    fn checked_offset_detects_overflow() {
        let a = BBox::new(3, 4, 10, 10);
        assert_eq!(a.checked_offset(20, 15), Some(BBox::new(23, 19, 10, 10)));
        assert_eq!(a.checked_offset(usize::MAX, 0), None);
    }

    #[test]
    fn template_size_rejects_zero() {
        assert_eq!(
            TemplateSize::new(0, 4).err(),
            Some(PeakError::InvalidTemplateSize {
                width: 0,
                height: 4
            })
        );
    }
}
