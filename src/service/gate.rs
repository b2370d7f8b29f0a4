//! Minimum-data gate for forecasting
//!
//! Day-of-week patterns mean little over a couple of weeks of sparse data.
//! The aggregator itself accepts any series; this gate decides whether the
//! service should run it at all.

use crate::config::ForecastConfig;
use crate::series::EchoSeries;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the forecast gate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GateDecision {
    Ready { echo_count: usize },
    InsufficientData { echo_count: usize, min_required: usize },
}

impl GateDecision {
    pub fn is_ready(&self) -> bool {
        matches!(self, GateDecision::Ready { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ForecastGate {
    min_echoes: usize,
    lookback: Duration,
}

impl ForecastGate {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            min_echoes: config.min_echoes,
            lookback: Duration::days(config.lookback_days),
        }
    }

    /// Start of the lookback window ending at `as_of`
    pub fn window_start(&self, as_of: DateTime<Utc>) -> DateTime<Utc> {
        as_of - self.lookback
    }

    /// Count echoes inside `[as_of - lookback, as_of]` and compare with the minimum
    pub fn check(&self, series: &EchoSeries, as_of: DateTime<Utc>) -> GateDecision {
        let since = self.window_start(as_of);
        let echo_count = series
            .iter()
            .map(|r| r.timestamp.with_timezone(&Utc))
            .filter(|t| *t >= since && *t <= as_of)
            .count();

        if echo_count >= self.min_echoes {
            GateDecision::Ready { echo_count }
        } else {
            GateDecision::InsufficientData {
                echo_count,
                min_required: self.min_echoes,
            }
        }
    }
}

impl Default for ForecastGate {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::EchoRecord;
    use chrono::{FixedOffset, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap()
    }

    fn every_other_day(count: usize) -> EchoSeries {
        let start = as_of().with_timezone(&FixedOffset::east_opt(0).unwrap());
        let records = (0..count)
            .map(|i| EchoRecord::new(start - Duration::days(2 * i as i64), 0.0))
            .collect();
        EchoSeries::new(records).unwrap()
    }

    #[test]
    fn test_thirteen_echoes_is_not_enough() {
        let decision = ForecastGate::default().check(&every_other_day(13), as_of());
        assert_eq!(
            decision,
            GateDecision::InsufficientData {
                echo_count: 13,
                min_required: 14
            }
        );
        assert!(!decision.is_ready());
    }

    #[test]
    fn test_fourteen_echoes_is_ready() {
        let decision = ForecastGate::default().check(&every_other_day(14), as_of());
        assert_eq!(decision, GateDecision::Ready { echo_count: 14 });
    }

    #[test]
    fn test_echoes_outside_lookback_do_not_count() {
        // 40 echoes every other day reach back 78 days; only 31 fall inside 60
        let decision = ForecastGate::default().check(&every_other_day(40), as_of());
        assert_eq!(decision, GateDecision::Ready { echo_count: 31 });

        let strict = ForecastGate::new(&ForecastConfig {
            min_echoes: 35,
            ..ForecastConfig::default()
        });
        assert!(!strict.check(&every_other_day(40), as_of()).is_ready());
    }

    #[test]
    fn test_echoes_after_as_of_do_not_count() {
        let start = as_of().with_timezone(&FixedOffset::east_opt(0).unwrap());
        let future: Vec<_> = (0..14)
            .rev()
            .map(|i| EchoRecord::new(start + Duration::days(i + 1), 0.0))
            .collect();
        let series = EchoSeries::new(future).unwrap();

        assert_eq!(
            ForecastGate::default().check(&series, as_of()),
            GateDecision::InsufficientData {
                echo_count: 0,
                min_required: 14
            }
        );
    }

    #[test]
    fn test_empty_series() {
        let decision = ForecastGate::default().check(&EchoSeries::empty(), as_of());
        assert!(!decision.is_ready());
    }

    #[test]
    fn test_decision_serializes_with_status() {
        let json = serde_json::to_value(GateDecision::InsufficientData {
            echo_count: 3,
            min_required: 14,
        })
        .unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["min_required"], 14);
    }
}
