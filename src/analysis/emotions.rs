//! Emotion profile of the most recent echoes
//!
//! Counts emotion tags so downstream generators can ground suggestions in
//! what the user has actually been feeling. Tag meaning is not interpreted.

use crate::config::EmotionConfig;
use crate::series::{mean_mood, EchoSeries};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How often a tag appeared
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmotionCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionProfile {
    pub echo_count: usize,
    pub avg_mood: Option<f64>,
    /// The most frequent tags
    pub dominant: Vec<EmotionCount>,
    /// Every tag seen, most frequent first
    pub tag_counts: Vec<EmotionCount>,
}

impl EmotionProfile {
    /// Whether `tag` appeared, ignoring case and surrounding whitespace
    pub fn contains(&self, tag: &str) -> bool {
        let wanted = normalize(tag);
        self.tag_counts.iter().any(|c| c.tag == wanted)
    }

    /// The single most frequent tag
    pub fn top(&self) -> Option<&str> {
        self.dominant.first().map(|c| c.tag.as_str())
    }
}

/// Counts emotion tags over a recent window
#[derive(Debug, Clone, Default)]
pub struct EmotionProfiler {
    config: EmotionConfig,
}

impl EmotionProfiler {
    pub fn new(config: EmotionConfig) -> Self {
        Self { config }
    }

    /// Profile the newest `window_records` echoes
    ///
    /// Ties keep the order tags were first seen in, newest echo first.
    pub fn profile(&self, series: &EchoSeries) -> EmotionProfile {
        let window = series.latest(self.config.window_records);

        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut tag_counts: Vec<EmotionCount> = Vec::new();

        for tag in window.iter().flat_map(|r| r.emotion_tags.iter()) {
            let tag = normalize(tag);
            if tag.is_empty() {
                continue;
            }
            match positions.get(&tag) {
                Some(&i) => tag_counts[i].count += 1,
                None => {
                    positions.insert(tag.clone(), tag_counts.len());
                    tag_counts.push(EmotionCount { tag, count: 1 });
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts
        tag_counts.sort_by(|a, b| b.count.cmp(&a.count));

        EmotionProfile {
            echo_count: window.len(),
            avg_mood: mean_mood(window),
            dominant: tag_counts.iter().take(self.config.top_n).cloned().collect(),
            tag_counts,
        }
    }
}

fn normalize(tag: &str) -> String {
    tag.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::EchoRecord;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn series(tags: &[&[&str]]) -> EchoSeries {
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 2, 10, 9, 0, 0)
            .unwrap();
        let records = tags
            .iter()
            .enumerate()
            .map(|(i, t)| EchoRecord::new(start - Duration::days(i as i64), -0.1).tags(t.iter().copied()))
            .collect();
        EchoSeries::new(records).unwrap()
    }

    #[test]
    fn test_empty_profile() {
        let profile = EmotionProfiler::default().profile(&EchoSeries::empty());
        assert_eq!(profile.echo_count, 0);
        assert_eq!(profile.avg_mood, None);
        assert!(profile.dominant.is_empty());
        assert_eq!(profile.top(), None);
    }

    #[test]
    fn test_counts_and_ranks() {
        let profile = EmotionProfiler::default().profile(&series(&[
            &["calm", "Anxiety"],
            &["anxiety", "tired"],
            &["tired", " anxiety "],
            &["joy"],
        ]));

        assert_eq!(profile.top(), Some("anxiety"));
        let dominant: Vec<(&str, usize)> =
            profile.dominant.iter().map(|c| (c.tag.as_str(), c.count)).collect();
        assert_eq!(dominant, vec![("anxiety", 3), ("tired", 2), ("calm", 1)]);
        assert_eq!(profile.tag_counts.len(), 4);
    }

    #[test]
    fn test_contains_ignores_case() {
        let profile = EmotionProfiler::default().profile(&series(&[&["Gratitude"]]));
        assert!(profile.contains("gratitude"));
        assert!(profile.contains(" GRATITUDE"));
        assert!(!profile.contains("anxiety"));
    }

    #[test]
    fn test_window_limits_records() {
        let calm: &[&str] = &["calm"];
        let rage: &[&str] = &["rage"];
        let mut tags = vec![calm; 10];
        tags.push(rage);
        let profile = EmotionProfiler::default().profile(&series(&tags));

        assert_eq!(profile.echo_count, 10);
        assert!(!profile.contains("rage"));
    }

    #[test]
    fn test_blank_tags_skipped() {
        let profile = EmotionProfiler::default().profile(&series(&[&["", "  ", "calm"]]));
        assert_eq!(profile.tag_counts.len(), 1);
    }
}
