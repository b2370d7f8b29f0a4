//! Trajectory Estimator
//!
//! Compares the most recent window of echoes against the window right behind
//! it and reports the current baseline for future-state simulation.

use crate::config::TrajectoryConfig;
use crate::series::{mean_mood, EchoSeries};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Direction of mood over the compared windows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current-state baseline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryReport {
    /// Mean mood of the recent window (0.0 with no echoes)
    pub baseline_mood: f64,
    pub trend: Trend,
    /// Activities completed in the trailing activity window
    pub activity_frequency: usize,
    /// Recent window fill ratio, 0.0 to 1.0
    pub consistency: f64,
    /// Echoes in the analyzed series
    pub echo_count: usize,
    pub recent_sample_size: usize,
    /// Mean of the older window, absent when there is no older history
    pub older_mean: Option<f64>,
    pub older_sample_size: usize,
}

/// Windowed trend classifier
#[derive(Debug, Clone, Default)]
pub struct TrajectoryEstimator {
    config: TrajectoryConfig,
}

impl TrajectoryEstimator {
    pub fn new(config: TrajectoryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrajectoryConfig {
        &self.config
    }

    /// Estimate the trajectory as of `as_of`
    ///
    /// `activity_completions` is a flat list of completion times across all
    /// activity types; only those inside the trailing window ending at
    /// `as_of` are counted.
    pub fn analyze(
        &self,
        series: &EchoSeries,
        activity_completions: &[DateTime<Utc>],
        as_of: DateTime<Utc>,
    ) -> TrajectoryReport {
        let recent_len = self.config.recent_window;
        let recent = series.latest(recent_len);
        let older = series.window(recent_len, recent_len + self.config.older_window);

        let activity_frequency = if series.is_empty() {
            0
        } else {
            self.count_activities(activity_completions, as_of)
        };

        let Some(recent_mean) = mean_mood(recent) else {
            return TrajectoryReport {
                baseline_mood: 0.0,
                trend: Trend::Stable,
                activity_frequency,
                consistency: 0.0,
                echo_count: 0,
                recent_sample_size: 0,
                older_mean: None,
                older_sample_size: 0,
            };
        };

        let older_mean = mean_mood(older);
        let trend = classify(
            recent_mean,
            older_mean.unwrap_or(recent_mean),
            self.config.trend_margin,
        );

        tracing::debug!(
            recent_mean,
            older_mean = ?older_mean,
            trend = %trend,
            activity_frequency,
            "Estimated trajectory"
        );

        TrajectoryReport {
            baseline_mood: recent_mean,
            trend,
            activity_frequency,
            consistency: recent.len() as f64 / recent_len as f64,
            echo_count: series.len(),
            recent_sample_size: recent.len(),
            older_mean,
            older_sample_size: older.len(),
        }
    }

    fn count_activities(&self, completions: &[DateTime<Utc>], as_of: DateTime<Utc>) -> usize {
        let since = as_of - Duration::days(self.config.activity_window_days);
        completions
            .iter()
            .filter(|&&t| t >= since && t <= as_of)
            .count()
    }
}

fn classify(recent_mean: f64, older_mean: f64, margin: f64) -> Trend {
    if recent_mean > older_mean + margin {
        Trend::Improving
    } else if recent_mean < older_mean - margin {
        Trend::Declining
    } else {
        Trend::Stable
    }
}
