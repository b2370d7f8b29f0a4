//! In-memory echo source
//!
//! Holds echoes and activity completions per user behind a tokio `RwLock`.
//! Useful for embedding the engine without a database and for tests.

use super::collaborators::{EchoQuery, EchoSource, SourceError};
use crate::series::EchoRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct UserHistory {
    echoes: Vec<EchoRecord>,
    activities: Vec<DateTime<Utc>>,
}

/// Echo source backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryEchoSource {
    users: RwLock<HashMap<String, UserHistory>>,
}

impl InMemoryEchoSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an echo for a user, in any order
    pub async fn add_echo(&self, user_id: &str, echo: EchoRecord) {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().echoes.push(echo);
    }

    /// Record many echoes for a user
    pub async fn add_echoes(&self, user_id: &str, echoes: impl IntoIterator<Item = EchoRecord>) {
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_default()
            .echoes
            .extend(echoes);
    }

    /// Record an activity completion of any type
    pub async fn add_activity(&self, user_id: &str, completed_at: DateTime<Utc>) {
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_default()
            .activities
            .push(completed_at);
    }
}

#[async_trait]
impl EchoSource for InMemoryEchoSource {
    async fn echoes(&self, user_id: &str, query: EchoQuery) -> Result<Vec<EchoRecord>, SourceError> {
        let users = self.users.read().await;
        let history = users
            .get(user_id)
            .ok_or_else(|| SourceError::UserNotFound(user_id.to_string()))?;

        let mut echoes: Vec<EchoRecord> = history
            .echoes
            .iter()
            .filter(|e| query.admits(e.timestamp.with_timezone(&Utc)))
            .cloned()
            .collect();

        echoes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = query.limit {
            echoes.truncate(limit);
        }

        Ok(echoes)
    }

    async fn activity_completions(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, SourceError> {
        let users = self.users.read().await;
        let history = users
            .get(user_id)
            .ok_or_else(|| SourceError::UserNotFound(user_id.to_string()))?;

        Ok(history
            .activities
            .iter()
            .copied()
            .filter(|t| *t >= since)
            .collect())
    }
}
