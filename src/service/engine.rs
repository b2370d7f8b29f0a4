//! Pattern Service
//!
//! The orchestration boundary around the analyzers:
//! 1. Fetches the right window of echoes from the [`EchoSource`]
//! 2. Validates them into an [`EchoSeries`]
//! 3. Applies the forecast gate where it belongs
//! 4. Runs the analyzer and, if the result is worth it, asks the
//!    [`NarrativeGenerator`] for content under a timeout
//!
//! Narrative failures never fail a request: the collaborator's static
//! fallback is attached instead and the structured report is unchanged.

use super::collaborators::{
    EchoQuery, EchoSource, Narrative, NarrativeGenerator, NarrativeSource, SourceError,
};
use super::gate::{ForecastGate, GateDecision};
use crate::analysis::{
    Analyzers, DayForecast, DayOfWeekReport, EmotionProfile, InterventionReport, PatternReport,
    TrajectoryReport, UpcomingAlert,
};
use crate::config::Config;
use crate::series::{EchoSeries, SeriesError};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Errors a service call can return
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Echo source error: {0}")]
    Source(#[from] SourceError),

    #[error("Invalid echo series: {0}")]
    Series(#[from] SeriesError),
}

/// Result type alias for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// A report with its narrative, if one was requested
#[derive(Debug, Clone, Serialize)]
pub struct Narrated<T> {
    pub report: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<Narrative>,
}

/// Result of a forecast request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    /// The gate held the request back
    InsufficientData { echo_count: usize, min_required: usize },
    /// Enough data, but no weekday runs low
    NoPatterns { report: DayOfWeekReport },
    /// Challenging days found and dated
    Forecast {
        report: DayOfWeekReport,
        forecasts: Vec<DayForecast>,
        upcoming: Vec<UpcomingAlert>,
        narrative: Narrative,
    },
}

/// All three analyzer reports over one series
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisBundle {
    pub gate: GateDecision,
    pub day_of_week: DayOfWeekReport,
    pub trajectory: TrajectoryReport,
    pub intervention: InterventionReport,
}

/// Runs analyzers against a user's stored echoes
pub struct PatternService {
    source: Arc<dyn EchoSource>,
    narrator: Arc<dyn NarrativeGenerator>,
    analyzers: Analyzers,
    gate: ForecastGate,
    config: Config,
    narrative_timeout: std::time::Duration,
}

impl PatternService {
    pub fn new(
        source: Arc<dyn EchoSource>,
        narrator: Arc<dyn NarrativeGenerator>,
        config: Config,
    ) -> Self {
        Self {
            source,
            narrator,
            analyzers: Analyzers::new(&config.analysis),
            gate: ForecastGate::new(&config.analysis.forecast),
            narrative_timeout: std::time::Duration::from_secs(
                config.service.narrative_timeout_secs,
            ),
            config,
        }
    }

    /// Override the narrative timeout (finer than whole seconds)
    pub fn with_narrative_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.narrative_timeout = timeout;
        self
    }

    pub fn analyzers(&self) -> &Analyzers {
        &self.analyzers
    }

    /// Forecast challenging weekdays from the forecast lookback
    pub async fn forecast(&self, user_id: &str, as_of: DateTime<Utc>) -> ServiceResult<ForecastOutcome> {
        let since = self.gate.window_start(as_of);
        let series = self.fetch(user_id, EchoQuery::since(since).until(as_of)).await?;

        if let GateDecision::InsufficientData {
            echo_count,
            min_required,
        } = self.gate.check(&series, as_of)
        {
            tracing::info!(user_id, echo_count, min_required, "Not enough echoes to forecast");
            return Ok(ForecastOutcome::InsufficientData {
                echo_count,
                min_required,
            });
        }

        let report = self.analyzers.weekday.analyze(&series);
        if !report.has_patterns {
            tracing::info!(user_id, echoes = series.len(), "No challenging weekdays found");
            return Ok(ForecastOutcome::NoPatterns { report });
        }

        let today = local_today(&series, as_of);
        let forecasts = self.analyzers.forecast.forecast(&report, today);
        let upcoming = self.analyzers.forecast.upcoming(&forecasts);

        let narrative = self.narrate(&PatternReport::DayOfWeek(report.clone())).await;

        tracing::info!(
            user_id,
            forecasts = forecasts.len(),
            upcoming = upcoming.len(),
            "Forecast ready"
        );

        Ok(ForecastOutcome::Forecast {
            report,
            forecasts,
            upcoming,
            narrative,
        })
    }

    /// Check the most recent echoes for an intervention
    ///
    /// A narrative is only requested when an intervention is warranted.
    pub async fn check_intervention(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> ServiceResult<Narrated<InterventionReport>> {
        let cfg = &self.config.analysis.intervention;
        let query = EchoQuery {
            since: Some(intervention_window_start(cfg.lookback_days, as_of)),
            until: Some(as_of),
            limit: Some(cfg.window_records),
        };
        let series = self.fetch(user_id, query).await?;
        let report = self.analyzers.intervention.analyze(&series);

        if !report.needs_intervention {
            return Ok(Narrated {
                report,
                narrative: None,
            });
        }

        tracing::info!(
            user_id,
            pattern = %report.pattern,
            severity = report.severity,
            "Intervention triggered"
        );

        let narrative = self.narrate(&PatternReport::Intervention(report.clone())).await;

        Ok(Narrated {
            report,
            narrative: Some(narrative),
        })
    }

    /// Current-state baseline for future-self simulation
    pub async fn trajectory(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> ServiceResult<Narrated<TrajectoryReport>> {
        let (series, activities) = self.fetch_trajectory_inputs(user_id, as_of).await?;
        let report = self.analyzers.trajectory.analyze(&series, &activities, as_of);

        let narrative = self.narrate(&PatternReport::Trajectory(report.clone())).await;

        Ok(Narrated {
            report,
            narrative: Some(narrative),
        })
    }

    /// Dominant emotions over the newest echoes
    pub async fn emotion_profile(&self, user_id: &str) -> ServiceResult<EmotionProfile> {
        let limit = self.config.analysis.emotions.window_records;
        let series = self.fetch(user_id, EchoQuery::latest(limit)).await?;
        Ok(self.analyzers.emotions.profile(&series))
    }

    /// Run every analyzer over the forecast lookback, without narratives
    ///
    /// Day-of-week aggregation always runs here; the gate decision is
    /// reported alongside so the caller can decide what to surface.
    pub async fn analyze_all(&self, user_id: &str, as_of: DateTime<Utc>) -> ServiceResult<AnalysisBundle> {
        let since = self.gate.window_start(as_of);
        let series = self.fetch(user_id, EchoQuery::since(since).until(as_of)).await?;
        let recent = series.between(
            intervention_window_start(self.config.analysis.intervention.lookback_days, as_of),
            as_of,
        );
        let activity_since =
            as_of - Duration::days(self.config.analysis.trajectory.activity_window_days);
        let activities = self.source.activity_completions(user_id, activity_since).await?;

        Ok(AnalysisBundle {
            gate: self.gate.check(&series, as_of),
            day_of_week: self.analyzers.weekday.analyze(&series),
            trajectory: self.analyzers.trajectory.analyze(&series, &activities, as_of),
            intervention: self.analyzers.intervention.analyze(&recent),
        })
    }

    async fn fetch_trajectory_inputs(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> ServiceResult<(EchoSeries, Vec<DateTime<Utc>>)> {
        let cfg = &self.config.analysis.trajectory;
        let series = self
            .fetch(user_id, EchoQuery::latest(cfg.history_limit).until(as_of))
            .await?;
        let activities = self
            .source
            .activity_completions(user_id, as_of - Duration::days(cfg.activity_window_days))
            .await?;
        Ok((series, activities))
    }

    async fn fetch(&self, user_id: &str, query: EchoQuery) -> ServiceResult<EchoSeries> {
        let records = self.source.echoes(user_id, query).await?;
        let series = EchoSeries::new(records)?;
        tracing::debug!(user_id, echoes = series.len(), "Fetched echo series");
        Ok(series)
    }

    async fn narrate(&self, report: &PatternReport) -> Narrative {
        let kind = report.kind();
        let error = match tokio::time::timeout(self.narrative_timeout, self.narrator.generate(report)).await {
            Ok(Ok(content)) => {
                return Narrative {
                    source: NarrativeSource::Generated,
                    content,
                    error: None,
                }
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "narrative generation timed out after {}ms",
                self.narrative_timeout.as_millis()
            ),
        };

        tracing::warn!(kind = %kind, error = %error, "Using fallback narrative");
        Narrative {
            source: NarrativeSource::Fallback,
            content: self.narrator.fallback(report),
            error: Some(error),
        }
    }
}

fn intervention_window_start(lookback_days: i64, as_of: DateTime<Utc>) -> DateTime<Utc> {
    as_of - Duration::days(lookback_days)
}

/// Calendar date at `as_of` in the offset of the user's newest echo
///
/// Matches how weekdays are bucketed: in each echo's own offset.
fn local_today(series: &EchoSeries, as_of: DateTime<Utc>) -> NaiveDate {
    match series.newest() {
        Some(record) => as_of.with_timezone(record.timestamp.offset()).date_naive(),
        None => as_of.date_naive(),
    }
}
