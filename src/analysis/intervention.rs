//! Intervention Detector
//!
//! Looks at the last few echoes and decides whether proactive support
//! should fire. Rules are checked in priority order and the first match
//! wins, so severity is always a single interpretable number.

use crate::config::InterventionConfig;
use crate::series::{mean_mood, EchoSeries};
use serde::{Deserialize, Serialize};

/// Which rule classified the window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InterventionPattern {
    /// Too few echoes to judge
    InsufficientData,
    /// Several low-mood echoes in the window
    DecliningTrend,
    /// Window mean is low even without many individually low echoes
    PersistentLow,
    /// The newest echoes fell well below the rest of the window
    SuddenDrop,
    Stable,
}

impl InterventionPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionPattern::InsufficientData => "insufficient_data",
            InterventionPattern::DecliningTrend => "declining_trend",
            InterventionPattern::PersistentLow => "persistent_low",
            InterventionPattern::SuddenDrop => "sudden_drop",
            InterventionPattern::Stable => "stable",
        }
    }
}

impl std::fmt::Display for InterventionPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of intervention detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterventionReport {
    pub needs_intervention: bool,
    pub pattern: InterventionPattern,
    /// 0 (no action) to 5 (strongest signal)
    pub severity: u8,
    /// Echoes below the low-mood threshold in the window
    pub low_mood_days: usize,
    /// Window mean, absent when data was insufficient
    pub avg_mood: Option<f64>,
    /// Mean of the newest echoes used by the sudden-drop rule
    pub recent_avg: Option<f64>,
    /// Echoes in the analyzed window
    pub window_size: usize,
    /// Emotion tags of the newest echoes, newest first
    pub recent_emotions: Vec<Vec<String>>,
}

impl InterventionReport {
    fn insufficient(window_size: usize, recent_emotions: Vec<Vec<String>>) -> Self {
        Self {
            needs_intervention: false,
            pattern: InterventionPattern::InsufficientData,
            severity: 0,
            low_mood_days: 0,
            avg_mood: None,
            recent_avg: None,
            window_size,
            recent_emotions,
        }
    }
}

/// Short-window intervention classifier
#[derive(Debug, Clone, Default)]
pub struct InterventionDetector {
    config: InterventionConfig,
}

impl InterventionDetector {
    pub fn new(config: InterventionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterventionConfig {
        &self.config
    }

    /// Classify the newest echoes of `series`
    ///
    /// Only the newest `window_records` echoes are considered even if the
    /// caller passes a longer series.
    pub fn analyze(&self, series: &EchoSeries) -> InterventionReport {
        let cfg = &self.config;
        let window = series.latest(cfg.window_records);
        let recent_emotions: Vec<Vec<String>> = window
            .iter()
            .take(cfg.sudden_drop_records)
            .map(|r| r.emotion_tags.clone())
            .collect();

        let avg_mood = match mean_mood(window) {
            Some(avg) if window.len() >= cfg.min_records => avg,
            _ => return InterventionReport::insufficient(window.len(), recent_emotions),
        };

        let low_mood_days = window
            .iter()
            .filter(|r| r.mood_score < cfg.low_mood_below)
            .count();

        // Newest echoes are a subset of the window, so recent_avg pulls
        // avg_mood toward itself; the comparison is kept as is.
        let recent_avg = if window.len() >= cfg.sudden_drop_records {
            mean_mood(&window[..cfg.sudden_drop_records])
        } else {
            None
        };

        let (pattern, severity) = if low_mood_days >= cfg.declining_min_low_days {
            let severity = low_mood_days.min(cfg.max_severity as usize) as u8;
            (InterventionPattern::DecliningTrend, severity)
        } else if avg_mood < cfg.persistent_low_below {
            (InterventionPattern::PersistentLow, cfg.persistent_low_severity)
        } else if recent_avg.is_some_and(|r| {
            r < cfg.sudden_drop_below && r < avg_mood - cfg.sudden_drop_margin
        }) {
            (InterventionPattern::SuddenDrop, cfg.sudden_drop_severity)
        } else {
            (InterventionPattern::Stable, 0)
        };

        let needs_intervention = pattern != InterventionPattern::Stable;

        if needs_intervention {
            tracing::debug!(
                pattern = %pattern,
                severity,
                low_mood_days,
                avg_mood,
                "Intervention warranted"
            );
        }

        InterventionReport {
            needs_intervention,
            pattern,
            severity,
            low_mood_days,
            avg_mood: Some(avg_mood),
            recent_avg,
            window_size: window.len(),
            recent_emotions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::EchoRecord;
    use chrono::{DateTime, Duration, FixedOffset, TimeZone};

    fn start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 20, 21, 0, 0)
            .unwrap()
    }

    /// Newest first, one echo per day
    fn daily(moods: &[f64]) -> EchoSeries {
        let records = moods
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                EchoRecord::new(start() - Duration::days(i as i64), m).tag(format!("tag{}", i))
            })
            .collect();
        EchoSeries::new(records).unwrap()
    }

    fn detect(moods: &[f64]) -> InterventionReport {
        InterventionDetector::default().analyze(&daily(moods))
    }

    #[test]
    fn test_fewer_than_three_is_insufficient() {
        for moods in [&[][..], &[-0.9][..], &[-0.9, -0.9][..]] {
            let report = detect(moods);
            assert!(!report.needs_intervention);
            assert_eq!(report.pattern, InterventionPattern::InsufficientData);
            assert_eq!(report.severity, 0);
            assert_eq!(report.avg_mood, None);
        }
    }

    #[test]
    fn test_declining_trend_four_low_days() {
        let report = detect(&[-0.25, -0.3, 0.1, -0.5, 0.2, -0.25, 0.0]);

        assert!(report.needs_intervention);
        assert_eq!(report.pattern, InterventionPattern::DecliningTrend);
        assert_eq!(report.severity, 4);
        assert_eq!(report.low_mood_days, 4);
    }

    #[test]
    fn test_declining_severity_caps_at_five() {
        let report = detect(&[-0.9; 7]);
        assert_eq!(report.pattern, InterventionPattern::DecliningTrend);
        assert_eq!(report.severity, 5);
    }

    #[test]
    fn test_window_caps_at_seven() {
        // Only two low echoes in the newest seven; older ones don't count
        let mut moods = vec![-0.5, -0.5, 0.5, 0.3, 0.3, 0.3, 0.3];
        moods.extend([-0.9; 10]);

        let report = detect(&moods);
        assert_eq!(report.window_size, 7);
        assert_eq!(report.low_mood_days, 2);
        assert_eq!(report.pattern, InterventionPattern::Stable);
    }

    #[test]
    fn test_persistent_low_with_one_low_day() {
        // Mean -0.35, only the oldest echo is below -0.2
        let report = detect(&[-0.2, -0.2, -0.65]);
        assert_eq!(report.low_mood_days, 1);
        assert!((report.avg_mood.unwrap() + 0.35).abs() < 1e-9);
        assert_eq!(report.pattern, InterventionPattern::PersistentLow);
        assert_eq!(report.severity, 3);
    }

    #[test]
    fn test_persistent_low_full_week() {
        // Seven echoes averaging -0.35 need at least two below -0.2 when
        // scores are bounded at -1.0; two is still short of rule a.
        let report = detect(&[-0.2, -0.2, -0.725, -0.2, -0.2, -0.725, -0.2]);
        assert_eq!(report.window_size, 7);
        assert_eq!(report.low_mood_days, 2);
        assert!((report.avg_mood.unwrap() + 0.35).abs() < 1e-9);
        assert_eq!(report.pattern, InterventionPattern::PersistentLow);
        assert_eq!(report.severity, 3);
    }

    #[test]
    fn test_sudden_drop() {
        // -0.2 is not below the low-mood threshold, so only two low days
        let report = detect(&[-0.35, -0.35, -0.2, 0.6, 0.6, 0.6, 0.6]);

        assert_eq!(report.low_mood_days, 2);
        let avg = report.avg_mood.unwrap();
        let recent = report.recent_avg.unwrap();
        assert!(recent < -0.2);
        assert!(recent < avg - 0.3);
        assert_eq!(report.pattern, InterventionPattern::SuddenDrop);
        assert_eq!(report.severity, 4);
    }

    #[test]
    fn test_sudden_drop_self_reference_in_short_window() {
        // With exactly three echoes the newest three are the whole window,
        // so the drop rule can never fire.
        let report = detect(&[-0.3, -0.25, 0.1]);
        assert_eq!(report.recent_avg, report.avg_mood);
        assert_eq!(report.pattern, InterventionPattern::Stable);
        assert!(!report.needs_intervention);
    }

    #[test]
    fn test_stable() {
        let report = detect(&[0.2, 0.1, -0.1, 0.0, 0.3]);
        assert!(!report.needs_intervention);
        assert_eq!(report.pattern, InterventionPattern::Stable);
        assert_eq!(report.severity, 0);
    }

    #[test]
    fn test_declining_preempts_persistent_low() {
        // Mean is far below -0.3 too, but rule a wins
        let report = detect(&[-0.8, -0.8, -0.8, 0.0]);
        assert_eq!(report.pattern, InterventionPattern::DecliningTrend);
        assert_eq!(report.severity, 3);
    }

    #[test]
    fn test_recent_emotions_are_newest_three() {
        let report = detect(&[0.1, 0.1, 0.1, 0.1, 0.1]);
        assert_eq!(
            report.recent_emotions,
            vec![vec!["tag0".to_string()], vec!["tag1".to_string()], vec!["tag2".to_string()]]
        );
    }

    #[test]
    fn test_severity_always_in_range() {
        let samples = [-1.0, -0.6, -0.35, -0.21, -0.2, 0.0, 0.4, 1.0];
        for len in 0..10 {
            for (i, &a) in samples.iter().enumerate() {
                let moods: Vec<f64> = (0..len)
                    .map(|j| if j % 2 == 0 { a } else { samples[(i + j) % samples.len()] })
                    .collect();
                let report = detect(&moods);
                assert!(report.severity <= 5);
                assert_eq!(report.needs_intervention, report.severity > 0);
            }
        }
    }

    #[test]
    fn test_pattern_serializes_snake_case() {
        let json = serde_json::to_string(&InterventionPattern::InsufficientData).unwrap();
        assert_eq!(json, "\"insufficient_data\"");
    }
}
