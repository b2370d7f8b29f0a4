//! Collaborator contracts
//!
//! The engine reads echoes through [`EchoSource`] and hands finished reports
//! to a [`NarrativeGenerator`]. Both live outside this crate; the service
//! only depends on these traits.

use crate::analysis::PatternReport;
use crate::series::EchoRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which echoes to fetch for a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EchoQuery {
    /// Only echoes at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only echoes at or before this instant
    pub until: Option<DateTime<Utc>>,
    /// At most this many echoes, newest kept
    pub limit: Option<usize>,
}

impl EchoQuery {
    pub fn since(since: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            ..Self::default()
        }
    }

    pub fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Builder method: drop echoes after `until`
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// True when `timestamp` falls inside the query's time bounds
    pub fn admits(&self, timestamp: DateTime<Utc>) -> bool {
        self.since.map_or(true, |since| timestamp >= since)
            && self.until.map_or(true, |until| timestamp <= until)
    }
}

/// Errors from the persistence collaborator
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Echo source unavailable: {0}")]
    Unavailable(String),
}

/// Persistence collaborator: supplies echoes and activity history
#[async_trait]
pub trait EchoSource: Send + Sync {
    /// Echoes matching `query`, newest first
    async fn echoes(&self, user_id: &str, query: EchoQuery) -> Result<Vec<EchoRecord>, SourceError>;

    /// Completion times of every activity type at or after `since`
    async fn activity_completions(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, SourceError>;
}

/// Errors from the narrative collaborator
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("Narrative service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid narrative response: {0}")]
    InvalidResponse(String),
}

/// Narrative collaborator: turns structured reports into user-facing content
///
/// Implementations own every prompt, template and tone choice. The payload
/// is opaque to the engine.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, report: &PatternReport) -> Result<serde_json::Value, NarrativeError>;

    /// Static content used when `generate` fails or times out
    fn fallback(&self, report: &PatternReport) -> serde_json::Value;
}

/// Where a narrative payload came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeSource {
    Generated,
    Fallback,
}

/// Narrative payload attached to a report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Narrative {
    pub source: NarrativeSource,
    pub content: serde_json::Value,
    /// Why the fallback was used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
