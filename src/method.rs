//! Matching methods and their confidence model.
//!
//! Each method fixes three things: which extremum of the raw surface is the
//! best match, how a raw score maps to a confidence in `[0, 1]`, and which raw
//! value marks a location as permanently excluded during top-K extraction.

use crate::util::PeakError;
use std::fmt;
use std::str::FromStr;

/// Normalized similarity measure used to produce a score field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// Normalized correlation coefficient; raw scores lie in `[-1, 1]`, higher is better.
    #[default]
    CcoeffNormed,
    /// Normalized cross-correlation; raw scores lie in `[0, 1]`, higher is better.
    CcorrNormed,
    /// Normalized squared difference; raw scores lie in `[0, 1]`, lower is better.
    SqdiffNormed,
}

impl Method {
    /// All supported methods.
    pub const ALL: [Method; 3] = [
        Method::CcoeffNormed,
        Method::CcorrNormed,
        Method::SqdiffNormed,
    ];

    /// Returns `true` when the numeric minimum of the surface is the best match.
    pub fn best_is_minimum(self) -> bool {
        matches!(self, Method::SqdiffNormed)
    }

    /// Maps a raw score to a confidence clamped into `[0, 1]`.
    ///
    /// NaN raw scores map to zero confidence.
    pub fn confidence(self, raw: f32) -> f32 {
        let conf = match self {
            Method::SqdiffNormed => 1.0 - raw,
            Method::CcorrNormed => raw,
            Method::CcoeffNormed => (raw + 1.0) * 0.5,
        };
        if conf.is_nan() {
            return 0.0;
        }
        conf.clamp(0.0, 1.0)
    }

    /// Raw value written over suppressed locations.
    pub fn worst_sentinel(self) -> f32 {
        if self.best_is_minimum() {
            1.0
        } else {
            -1.0
        }
    }

    /// Raw value used where a window has no defined score (flat image or template).
    pub(crate) fn neutral_score(self) -> f32 {
        match self {
            Method::SqdiffNormed => 1.0,
            Method::CcorrNormed | Method::CcoeffNormed => 0.0,
        }
    }

    /// Returns `true` when `a` is a strictly better raw score than `b`.
    #[inline]
    pub(crate) fn is_better(self, a: f32, b: f32) -> bool {
        if self.best_is_minimum() {
            a < b
        } else {
            a > b
        }
    }

    /// Canonical command-line name.
    pub fn name(self) -> &'static str {
        match self {
            Method::CcoeffNormed => "ccoeff_normed",
            Method::CcorrNormed => "ccorr_normed",
            Method::SqdiffNormed => "sqdiff_normed",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = PeakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| PeakError::UnknownMethod { name: s.to_owned() })
    }
}
