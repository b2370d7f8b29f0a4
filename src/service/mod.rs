//! Pattern Service
//!
//! Orchestration around the pure analyzers: fetching, gating, narrating.
//!
//! ## Data Flow
//!
//! 1. [`EchoSource`] supplies newest-first echoes for a user and window
//! 2. Records are validated into an [`EchoSeries`](crate::series::EchoSeries)
//! 3. [`ForecastGate`] decides whether forecasting has enough history
//! 4. Analyzers produce typed reports
//! 5. [`NarrativeGenerator`] turns actionable reports into content, with a
//!    timeout and a static fallback

mod collaborators;
mod engine;
mod gate;
mod memory;

pub use collaborators::{
    EchoQuery, EchoSource, Narrative, NarrativeError, NarrativeGenerator, NarrativeSource,
    SourceError,
};
pub use engine::{
    AnalysisBundle, ForecastOutcome, Narrated, PatternService, ServiceError, ServiceResult,
};
pub use gate::{ForecastGate, GateDecision};
pub use memory::InMemoryEchoSource;
