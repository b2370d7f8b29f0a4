//! Core data types for echo series
//!
//! - `EchoRecord`: one mood-journal entry
//! - `EchoSeries`: a validated, newest-first run of records
//! - `MoodWindow`: small numeric helpers shared by the analyzers

use super::error::{SeriesError, SeriesResult};
use chrono::{DateTime, Datelike, FixedOffset, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Lowest legal mood score
pub const MOOD_MIN: f64 = -1.0;
/// Highest legal mood score
pub const MOOD_MAX: f64 = 1.0;

/// A single mood-journal entry ("echo")
///
/// Owned by the caller; the engine only ever borrows it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EchoRecord {
    /// When the echo was planted, in the user's offset
    pub timestamp: DateTime<FixedOffset>,
    /// Emotional valence in [-1.0, 1.0], 0 is neutral
    pub mood_score: f64,
    /// Emotion labels in user-entry order
    #[serde(default)]
    pub emotion_tags: Vec<String>,
}

impl EchoRecord {
    /// Create a record with no emotion tags
    pub fn new(timestamp: DateTime<FixedOffset>, mood_score: f64) -> Self {
        Self {
            timestamp,
            mood_score,
            emotion_tags: Vec::new(),
        }
    }

    /// Builder method: add an emotion tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.emotion_tags.push(tag.into());
        self
    }

    /// Builder method: add several emotion tags
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emotion_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Weekday of this echo in its own offset
    pub fn weekday(&self) -> Weekday {
        self.timestamp.weekday()
    }

    fn validate(&self, index: usize) -> SeriesResult<()> {
        if !self.mood_score.is_finite() {
            return Err(SeriesError::NonFiniteMood { index });
        }
        if !(MOOD_MIN..=MOOD_MAX).contains(&self.mood_score) {
            return Err(SeriesError::MoodOutOfRange {
                index,
                score: self.mood_score,
            });
        }
        Ok(())
    }
}

/// Validated, newest-first sequence of echoes
///
/// Construction is the only place input is checked. Analyzers take an
/// `&EchoSeries` and can rely on finite in-range scores and ordered
/// timestamps. An empty series is valid.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct EchoSeries {
    records: Vec<EchoRecord>,
}

impl EchoSeries {
    /// Build a series from records already ordered newest first
    pub fn new(records: Vec<EchoRecord>) -> SeriesResult<Self> {
        for (index, record) in records.iter().enumerate() {
            record.validate(index)?;
        }

        for (index, pair) in records.windows(2).enumerate() {
            if pair[1].timestamp > pair[0].timestamp {
                return Err(SeriesError::OutOfOrder {
                    index: index + 1,
                    timestamp: pair[1].timestamp,
                    previous: pair[0].timestamp,
                });
            }
        }

        Ok(Self { records })
    }

    /// Build a series from records ordered oldest first
    ///
    /// Indices in any returned error refer to the newest-first order.
    pub fn from_chronological(mut records: Vec<EchoRecord>) -> SeriesResult<Self> {
        records.reverse();
        Self::new(records)
    }

    /// An empty series
    pub fn empty() -> Self {
        Self::default()
    }

    /// Records, newest first
    pub fn records(&self) -> &[EchoRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the series holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The `n` most recent records (fewer if the series is shorter)
    pub fn latest(&self, n: usize) -> &[EchoRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Records in `[start, end)` by newest-first index, clamped to the series
    pub fn window(&self, start: usize, end: usize) -> &[EchoRecord] {
        let len = self.records.len();
        let start = start.min(len);
        let end = end.clamp(start, len);
        &self.records[start..end]
    }

    /// Records timestamped in `[since, until]`, order preserved
    pub fn between(&self, since: DateTime<Utc>, until: DateTime<Utc>) -> EchoSeries {
        let records = self
            .records
            .iter()
            .filter(|r| {
                let t = r.timestamp.with_timezone(&Utc);
                t >= since && t <= until
            })
            .cloned()
            .collect();
        EchoSeries { records }
    }

    /// Most recent record
    pub fn newest(&self) -> Option<&EchoRecord> {
        self.records.first()
    }

    /// Oldest record
    pub fn oldest(&self) -> Option<&EchoRecord> {
        self.records.last()
    }

    /// Iterate records newest first
    pub fn iter(&self) -> std::slice::Iter<'_, EchoRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a EchoSeries {
    type Item = &'a EchoRecord;
    type IntoIter = std::slice::Iter<'a, EchoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl TryFrom<Vec<EchoRecord>> for EchoSeries {
    type Error = SeriesError;

    fn try_from(records: Vec<EchoRecord>) -> SeriesResult<Self> {
        Self::new(records)
    }
}

/// Mean mood over a slice of records, `None` when empty
pub fn mean_mood(records: &[EchoRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    Some(records.iter().map(|r| r.mood_score).sum::<f64>() / records.len() as f64)
}
