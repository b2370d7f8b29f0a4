//! Forecast Planner
//!
//! Dates the ranked challenging weekdays and picks out the ones close enough
//! to surface as upcoming alerts.

use super::weekday::{days_until, ChallengingDay, DayOfWeek, DayOfWeekReport};
use crate::config::ForecastConfig;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A challenging weekday pinned to its next date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayForecast {
    pub day: DayOfWeek,
    pub mean_mood: f64,
    pub confidence: f64,
    pub sample_size: usize,
    pub next_date: NaiveDate,
    /// Always 1..=7
    pub days_away: i64,
}

/// A forecast inside the alert horizon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpcomingAlert {
    #[serde(flatten)]
    pub forecast: DayForecast,
    pub is_urgent: bool,
}

/// Turns day-of-week reports into dated forecasts
#[derive(Debug, Clone, Default)]
pub struct ForecastPlanner {
    config: ForecastConfig,
}

impl ForecastPlanner {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast the worst ranked challenging days relative to `today`
    pub fn forecast(&self, report: &DayOfWeekReport, today: NaiveDate) -> Vec<DayForecast> {
        report
            .challenging_days
            .iter()
            .take(self.config.max_forecasts)
            .map(|c| dated(c, today))
            .collect()
    }

    /// Forecasts due within the alert horizon, soonest first
    pub fn upcoming(&self, forecasts: &[DayForecast]) -> Vec<UpcomingAlert> {
        let mut alerts: Vec<UpcomingAlert> = forecasts
            .iter()
            .filter(|f| f.days_away <= self.config.alert_horizon_days)
            .map(|f| UpcomingAlert {
                forecast: f.clone(),
                is_urgent: f.days_away <= self.config.urgent_within_days,
            })
            .collect();

        alerts.sort_by_key(|a| a.forecast.days_away);
        alerts
    }
}

fn dated(day: &ChallengingDay, today: NaiveDate) -> DayForecast {
    let days_away = days_until(day.day, today.weekday());
    DayForecast {
        day: day.day,
        mean_mood: day.mean_mood,
        confidence: day.confidence,
        sample_size: day.sample_size,
        next_date: today + Duration::days(days_away),
        days_away,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(days: &[(DayOfWeek, f64, usize)]) -> DayOfWeekReport {
        DayOfWeekReport {
            day_stats: Vec::new(),
            challenging_days: days
                .iter()
                .map(|&(day, mean_mood, n)| ChallengingDay {
                    day,
                    mean_mood,
                    confidence: (n as f64 / 5.0).min(1.0),
                    sample_size: n,
                })
                .collect(),
            has_patterns: !days.is_empty(),
            echo_count: 20,
        }
    }

    // 2024-01-03 is a Wednesday
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
    }

    #[test]
    fn test_forecasts_top_two() {
        let report = report(&[
            (DayOfWeek::Monday, -0.6, 3),
            (DayOfWeek::Thursday, -0.4, 2),
            (DayOfWeek::Sunday, -0.2, 4),
        ]);

        let forecasts = ForecastPlanner::default().forecast(&report, wednesday());

        assert_eq!(forecasts.len(), 2);
        assert_eq!(forecasts[0].day, DayOfWeek::Monday);
        assert_eq!(forecasts[0].days_away, 5);
        assert_eq!(forecasts[0].next_date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(forecasts[1].day, DayOfWeek::Thursday);
        assert_eq!(forecasts[1].days_away, 1);
    }

    #[test]
    fn test_today_is_forecast_next_week() {
        let report = report(&[(DayOfWeek::Wednesday, -0.5, 5)]);
        let forecasts = ForecastPlanner::default().forecast(&report, wednesday());

        assert_eq!(forecasts[0].days_away, 7);
        assert_eq!(forecasts[0].next_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn test_no_patterns_no_forecasts() {
        let forecasts = ForecastPlanner::default().forecast(&report(&[]), wednesday());
        assert!(forecasts.is_empty());
    }

    #[test]
    fn test_upcoming_sorted_and_urgent() {
        let report = report(&[(DayOfWeek::Monday, -0.6, 3), (DayOfWeek::Thursday, -0.4, 2)]);
        let planner = ForecastPlanner::default();
        let alerts = planner.upcoming(&planner.forecast(&report, wednesday()));

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].forecast.day, DayOfWeek::Thursday);
        assert!(alerts[0].is_urgent);
        assert!(!alerts[1].is_urgent);
    }

    #[test]
    fn test_upcoming_respects_horizon() {
        let planner = ForecastPlanner::new(ForecastConfig {
            alert_horizon_days: 3,
            ..ForecastConfig::default()
        });
        let report = report(&[(DayOfWeek::Monday, -0.6, 3), (DayOfWeek::Friday, -0.4, 2)]);
        let alerts = planner.upcoming(&planner.forecast(&report, wednesday()));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].forecast.day, DayOfWeek::Friday);
        assert_eq!(alerts[0].forecast.days_away, 2);
    }

    #[test]
    fn test_alert_serializes_flat() {
        let report = report(&[(DayOfWeek::Thursday, -0.4, 2)]);
        let planner = ForecastPlanner::default();
        let alerts = planner.upcoming(&planner.forecast(&report, wednesday()));

        let json = serde_json::to_value(&alerts[0]).unwrap();
        assert_eq!(json["day"], "Thursday");
        assert_eq!(json["next_date"], "2024-01-04");
        assert_eq!(json["is_urgent"], true);
    }
}
