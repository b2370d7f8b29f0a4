//! # echo-patterns
//!
//! Mood Pattern Analysis & Forecasting Engine. Takes a user's mood-journal
//! entries ("echoes") and derives structured behavioral signals for
//! downstream personalization.
//!
//! ## Features
//!
//! - **Day-of-week patterns**: weekdays that run consistently low, ranked
//!   with a confidence that grows with evidence
//! - **Forecasts**: the next date each challenging weekday comes around
//! - **Trajectory**: recent-vs-older trend and current baseline
//! - **Intervention triggers**: ranked rules over the last week of echoes
//! - **Emotion profile**: dominant emotion tags
//!
//! The analyzers are pure and stateless. Fetching echoes and writing prose
//! are collaborator jobs, reached through the traits in [`service`].
//!
//! ## Modules
//!
//! - [`series`]: validated echo input
//! - [`analysis`]: the analyzers and their reports
//! - [`service`]: orchestration, forecast gate, collaborator traits
//! - [`config`]: thresholds, windows, logging
//!
//! ## Quick Start
//!
//! ```rust
//! use echo_patterns::analysis::{InterventionDetector, InterventionPattern};
//! use echo_patterns::series::{EchoRecord, EchoSeries};
//! use chrono::{DateTime, Duration};
//!
//! let now = DateTime::parse_from_rfc3339("2024-05-20T21:00:00+01:00").unwrap();
//! let records = (0..7)
//!     .map(|i| EchoRecord::new(now - Duration::days(i), -0.4).tag("tired"))
//!     .collect();
//! let series = EchoSeries::new(records).unwrap();
//!
//! let report = InterventionDetector::default().analyze(&series);
//! assert_eq!(report.pattern, InterventionPattern::DecliningTrend);
//! assert_eq!(report.severity, 5);
//! ```

pub mod analysis;
pub mod config;
pub mod logging;
pub mod series;
pub mod service;

// Re-export top-level types for convenience
pub use series::{EchoRecord, EchoSeries, SeriesError, SeriesResult};

pub use analysis::{
    Analyzers, ChallengingDay, DayForecast, DayOfWeek, DayOfWeekAggregator, DayOfWeekReport,
    DayStat, EmotionProfile, EmotionProfiler, ForecastPlanner, InterventionDetector,
    InterventionPattern, InterventionReport, PatternReport, ReportKind, TrajectoryEstimator,
    TrajectoryReport, Trend, UpcomingAlert,
};

pub use service::{
    EchoQuery, EchoSource, ForecastGate, ForecastOutcome, GateDecision, InMemoryEchoSource,
    Narrative, NarrativeGenerator, NarrativeSource, PatternService, ServiceError,
};

pub use config::{AnalysisConfig, Config, ConfigError, LoggingConfig};
