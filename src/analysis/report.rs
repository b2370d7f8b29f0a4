//! Unified report type handed to the narrative generator

use super::intervention::InterventionReport;
use super::trajectory::TrajectoryReport;
use super::weekday::DayOfWeekReport;
use serde::{Deserialize, Serialize};

/// Output of any one analyzer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternReport {
    DayOfWeek(DayOfWeekReport),
    Trajectory(TrajectoryReport),
    Intervention(InterventionReport),
}

/// Discriminant of a [`PatternReport`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    DayOfWeek,
    Trajectory,
    Intervention,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::DayOfWeek => "day_of_week",
            ReportKind::Trajectory => "trajectory",
            ReportKind::Intervention => "intervention",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PatternReport {
    pub fn kind(&self) -> ReportKind {
        match self {
            PatternReport::DayOfWeek(_) => ReportKind::DayOfWeek,
            PatternReport::Trajectory(_) => ReportKind::Trajectory,
            PatternReport::Intervention(_) => ReportKind::Intervention,
        }
    }

    /// Whether the report carries something worth narrating
    ///
    /// Day-of-week reports need at least one challenging day, intervention
    /// reports need a firing rule. Trajectories always have a baseline.
    pub fn is_actionable(&self) -> bool {
        match self {
            PatternReport::DayOfWeek(r) => r.has_patterns,
            PatternReport::Trajectory(_) => true,
            PatternReport::Intervention(r) => r.needs_intervention,
        }
    }
}

impl From<DayOfWeekReport> for PatternReport {
    fn from(report: DayOfWeekReport) -> Self {
        PatternReport::DayOfWeek(report)
    }
}

impl From<TrajectoryReport> for PatternReport {
    fn from(report: TrajectoryReport) -> Self {
        PatternReport::Trajectory(report)
    }
}

impl From<InterventionReport> for PatternReport {
    fn from(report: InterventionReport) -> Self {
        PatternReport::Intervention(report)
    }
}
