//! Day-of-Week Aggregator
//!
//! Groups echoes by the weekday they were planted on, summarizes each
//! weekday, and ranks the ones that run consistently low. Also owns the
//! next-occurrence rule used when those weekdays are forecast.

use crate::config::WeekdayConfig;
use crate::series::{EchoRecord, EchoSeries};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Fewest echoes on one weekday that can establish a pattern
pub const MIN_PATTERN_SAMPLES: usize = 2;

/// Calendar weekday, Monday first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All weekdays, Monday through Sunday
    pub fn all() -> &'static [DayOfWeek] {
        &[
            DayOfWeek::Monday,
            DayOfWeek::Tuesday,
            DayOfWeek::Wednesday,
            DayOfWeek::Thursday,
            DayOfWeek::Friday,
            DayOfWeek::Saturday,
            DayOfWeek::Sunday,
        ]
    }

    /// Full English name, independent of locale
    pub fn name(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    /// Days since Monday (Monday = 0)
    pub fn index(&self) -> u32 {
        Weekday::from(*self).num_days_from_monday()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl From<DayOfWeek> for Weekday {
    fn from(day: DayOfWeek) -> Self {
        match day {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayOfWeek::all()
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown weekday: {}", s))
    }
}

/// Mood summary for one weekday
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayStat {
    pub day: DayOfWeek,
    pub count: usize,
    pub mean_mood: f64,
    pub min_mood: f64,
    pub max_mood: f64,
}

/// A weekday that runs low often enough to forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengingDay {
    pub day: DayOfWeek,
    pub mean_mood: f64,
    /// Trust in the pattern, 0.0 to 1.0
    pub confidence: f64,
    pub sample_size: usize,
}

/// Result of day-of-week aggregation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayOfWeekReport {
    /// Summaries for weekdays with enough samples, Monday first
    pub day_stats: Vec<DayStat>,
    /// Challenging weekdays, worst first
    pub challenging_days: Vec<ChallengingDay>,
    pub has_patterns: bool,
    /// Echoes in the analyzed series
    pub echo_count: usize,
}

impl DayOfWeekReport {
    /// Stats for one weekday, if it had enough samples
    pub fn stat_for(&self, day: DayOfWeek) -> Option<&DayStat> {
        self.day_stats.iter().find(|s| s.day == day)
    }
}

/// Confidence for a weekday pattern seen `count` times
///
/// Grows linearly and saturates at 1.0 once `count` reaches `saturation`.
pub fn confidence(count: usize, saturation: f64) -> f64 {
    (count as f64 / saturation).min(1.0)
}

/// Days from `today` until the next `target`, always in 1..=7
///
/// When today already is the target the answer is a full week: a pattern
/// is only ever forecast for the next cycle.
pub fn days_until(target: DayOfWeek, today: Weekday) -> i64 {
    let ahead = (target.index() as i64 - today.num_days_from_monday() as i64).rem_euclid(7);
    if ahead == 0 {
        7
    } else {
        ahead
    }
}

/// Date of the next `target` strictly after `today`
pub fn next_occurrence(target: DayOfWeek, today: NaiveDate) -> NaiveDate {
    today + Duration::days(days_until(target, today.weekday()))
}

/// Groups a series by weekday and ranks challenging days
#[derive(Debug, Clone, Default)]
pub struct DayOfWeekAggregator {
    config: WeekdayConfig,
}

impl DayOfWeekAggregator {
    pub fn new(config: WeekdayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WeekdayConfig {
        &self.config
    }

    /// Summarize every weekday and rank the challenging ones
    ///
    /// No minimum history is enforced here beyond the per-weekday sample
    /// count; gating on total history happens in the service layer.
    pub fn analyze(&self, series: &EchoSeries) -> DayOfWeekReport {
        let mut buckets: [Vec<&EchoRecord>; 7] = Default::default();
        for record in series {
            let day = DayOfWeek::from(record.weekday());
            buckets[day.index() as usize].push(record);
        }

        let min_samples = self.config.min_samples_per_day.max(MIN_PATTERN_SAMPLES);
        let day_stats: Vec<DayStat> = DayOfWeek::all()
            .iter()
            .zip(buckets.iter())
            .filter(|(_, records)| records.len() >= min_samples)
            .map(|(&day, records)| summarize(day, records))
            .collect();

        let mut challenging_days: Vec<ChallengingDay> = day_stats
            .iter()
            .filter(|s| s.mean_mood < self.config.challenging_mean_below)
            .map(|s| ChallengingDay {
                day: s.day,
                mean_mood: s.mean_mood,
                confidence: confidence(s.count, self.config.confidence_saturation_samples),
                sample_size: s.count,
            })
            .collect();

        challenging_days.sort_by(|a, b| {
            a.mean_mood
                .total_cmp(&b.mean_mood)
                .then_with(|| b.sample_size.cmp(&a.sample_size))
                .then_with(|| a.day.name().cmp(b.day.name()))
        });

        tracing::debug!(
            echoes = series.len(),
            summarized_days = day_stats.len(),
            challenging = challenging_days.len(),
            "Aggregated day-of-week patterns"
        );

        DayOfWeekReport {
            has_patterns: !challenging_days.is_empty(),
            day_stats,
            challenging_days,
            echo_count: series.len(),
        }
    }
}

fn summarize(day: DayOfWeek, records: &[&EchoRecord]) -> DayStat {
    let scores = records.iter().map(|r| r.mood_score);
    let sum: f64 = scores.clone().sum();

    DayStat {
        day,
        count: records.len(),
        mean_mood: sum / records.len() as f64,
        min_mood: scores.clone().fold(f64::INFINITY, f64::min),
        max_mood: scores.fold(f64::NEG_INFINITY, f64::max),
    }
}
