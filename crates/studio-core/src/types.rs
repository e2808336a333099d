use crate::error::StudioError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The six fixed stages every project moves through. Declaration order is the
/// canonical phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Discovery,
    Design,
    Development,
    Testing,
    Launch,
    Support,
}

impl Phase {
    pub fn all() -> &'static [Phase] {
        &[
            Phase::Discovery,
            Phase::Design,
            Phase::Development,
            Phase::Testing,
            Phase::Launch,
            Phase::Support,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Discovery => "discovery",
            Phase::Design => "design",
            Phase::Development => "development",
            Phase::Testing => "testing",
            Phase::Launch => "launch",
            Phase::Support => "support",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(Phase::Discovery),
            "design" => Ok(Phase::Design),
            "development" => Ok(Phase::Development),
            "testing" => Ok(Phase::Testing),
            "launch" => Ok(Phase::Launch),
            "support" => Ok(Phase::Support),
            _ => Err(StudioError::InvalidPhase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn all() -> &'static [ProjectStatus] {
        &[
            ProjectStatus::Planning,
            ProjectStatus::Active,
            ProjectStatus::OnHold,
            ProjectStatus::Completed,
            ProjectStatus::Cancelled,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on-hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::all()
            .iter()
            .copied()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| StudioError::InvalidStatus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MilestoneStatus
// ---------------------------------------------------------------------------

/// pending → in-progress → completed, with blocked reachable from pending or
/// in-progress. Transitions are not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl MilestoneStatus {
    pub fn all() -> &'static [MilestoneStatus] {
        &[
            MilestoneStatus::Pending,
            MilestoneStatus::InProgress,
            MilestoneStatus::Completed,
            MilestoneStatus::Blocked,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::InProgress => "in-progress",
            MilestoneStatus::Completed => "completed",
            MilestoneStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MilestoneStatus {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MilestoneStatus::all()
            .iter()
            .copied()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| StudioError::InvalidStatus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ProgressScheme
// ---------------------------------------------------------------------------

/// Which source a project's progress is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressScheme {
    Milestones,
    #[default]
    Substeps,
}

impl ProgressScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressScheme::Milestones => "milestones",
            ProgressScheme::Substeps => "substeps",
        }
    }
}

impl fmt::Display for ProgressScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProgressScheme {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "milestones" => Ok(ProgressScheme::Milestones),
            "substeps" => Ok(ProgressScheme::Substeps),
            _ => Err(StudioError::InvalidScheme(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
