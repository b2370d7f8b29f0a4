//! Echo series
//!
//! The validated input view every analyzer consumes. Records arrive from the
//! persistence layer newest first; this module checks the contract once so
//! the analyzers never have to.

mod error;
mod types;

pub use error::{SeriesError, SeriesResult};
pub use types::{mean_mood, EchoRecord, EchoSeries, MOOD_MAX, MOOD_MIN};
