//! Shared utility helpers.

pub mod error;

pub(crate) use error::{check_count, check_unit_interval};
pub use error::{PeakError, PeakResult};
