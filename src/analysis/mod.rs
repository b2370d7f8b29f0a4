//! Mood Pattern Analysis
//!
//! Pure analyzers over an [`EchoSeries`](crate::series::EchoSeries). Each
//! one is built from its section of [`AnalysisConfig`](crate::config::AnalysisConfig),
//! borrows the series, and returns a typed report. None of them keep state
//! between calls or depend on each other's output, so they can run in any
//! order or concurrently.
//!
//! ## Analyzers
//!
//! - **DayOfWeekAggregator**: weekday statistics and challenging days
//! - **TrajectoryEstimator**: recent-vs-older trend and baseline
//! - **InterventionDetector**: ranked short-window intervention rules
//! - **ForecastPlanner**: dated forecasts and upcoming alerts
//! - **EmotionProfiler**: dominant emotion tags

mod emotions;
mod forecast;
mod intervention;
mod report;
mod trajectory;
mod weekday;

pub use emotions::{EmotionCount, EmotionProfile, EmotionProfiler};
pub use forecast::{DayForecast, ForecastPlanner, UpcomingAlert};
pub use intervention::{InterventionDetector, InterventionPattern, InterventionReport};
pub use report::{PatternReport, ReportKind};
pub use trajectory::{Trend, TrajectoryEstimator, TrajectoryReport};
pub use weekday::{
    confidence, days_until, next_occurrence, ChallengingDay, DayOfWeek, DayOfWeekAggregator,
    DayOfWeekReport, DayStat, MIN_PATTERN_SAMPLES,
};

use crate::config::AnalysisConfig;

/// All analyzers built from one configuration
#[derive(Debug, Clone, Default)]
pub struct Analyzers {
    pub weekday: DayOfWeekAggregator,
    pub trajectory: TrajectoryEstimator,
    pub intervention: InterventionDetector,
    pub forecast: ForecastPlanner,
    pub emotions: EmotionProfiler,
}

impl Analyzers {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            weekday: DayOfWeekAggregator::new(config.weekday.clone()),
            trajectory: TrajectoryEstimator::new(config.trajectory.clone()),
            intervention: InterventionDetector::new(config.intervention.clone()),
            forecast: ForecastPlanner::new(config.forecast.clone()),
            emotions: EmotionProfiler::new(config.emotions.clone()),
        }
    }
}
