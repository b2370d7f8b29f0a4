//! Series validation errors
//!
//! These are the only errors the analysis engine raises: a caller handed in
//! records that break the series contract.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// Errors raised while building an [`EchoSeries`](super::EchoSeries)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// Mood score outside [-1.0, 1.0]
    #[error("Mood score {score} at index {index} is outside [-1.0, 1.0]")]
    MoodOutOfRange { index: usize, score: f64 },

    /// Mood score is NaN or infinite
    #[error("Mood score at index {index} is not a finite number")]
    NonFiniteMood { index: usize },

    /// Timestamps do not follow the expected ordering
    #[error("Echo at index {index} ({timestamp}) breaks newest-first ordering after {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: DateTime<FixedOffset>,
        previous: DateTime<FixedOffset>,
    },
}

/// Result type alias for series construction
pub type SeriesResult<T> = Result<T, SeriesError>;
