use crate::error::{FieldError, Result, StudioError};
use crate::types::{MilestoneStatus, Phase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Milestone
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub phase: Phase,
    #[serde(default)]
    pub substep: Option<String>,
    pub status: MilestoneStatus,
    pub weight: f64,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Ids of other milestones. Informational only; never enforced.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Milestone {
    pub fn new(title: impl Into<String>, phase: Phase) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            title: title.into(),
            description: String::new(),
            phase,
            substep: None,
            status: MilestoneStatus::Pending,
            weight: 1.0,
            due_date: None,
            completed_date: None,
            assigned_to: None,
            dependencies: Vec::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Client payload for a new milestone. Phase and status arrive as raw strings
/// so that bad values surface as field errors rather than parse failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewMilestone {
    pub title: String,
    pub description: Option<String>,
    pub phase: String,
    pub substep: Option<String>,
    pub status: Option<String>,
    pub weight: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub dependencies: Vec<String>,
    pub notes: Option<String>,
}

/// Partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MilestonePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub phase: Option<String>,
    pub substep: Option<String>,
    pub status: Option<String>,
    pub weight: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn check_title(title: &str, errors: &mut Vec<FieldError>) {
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "milestone title is required"));
    }
}

fn check_phase(phase: &str, errors: &mut Vec<FieldError>) -> Option<Phase> {
    match phase.parse::<Phase>() {
        Ok(p) => Some(p),
        Err(_) => {
            let allowed: Vec<&str> = Phase::all().iter().map(|p| p.as_str()).collect();
            errors.push(FieldError::new(
                "phase",
                format!("phase must be one of: {}", allowed.join(", ")),
            ));
            None
        }
    }
}

fn check_status(status: &str, errors: &mut Vec<FieldError>) -> Option<MilestoneStatus> {
    match status.parse::<MilestoneStatus>() {
        Ok(s) => Some(s),
        Err(_) => {
            let allowed: Vec<&str> = MilestoneStatus::all().iter().map(|s| s.as_str()).collect();
            errors.push(FieldError::new(
                "status",
                format!("status must be one of: {}", allowed.join(", ")),
            ));
            None
        }
    }
}

fn check_weight(weight: f64, errors: &mut Vec<FieldError>) {
    if !(weight.is_finite() && weight > 0.0) {
        errors.push(FieldError::new("weight", "weight must be a positive number"));
    }
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

// ---------------------------------------------------------------------------
// Milestone list operations (operate on a mutable Vec<Milestone>)
// ---------------------------------------------------------------------------

/// Validate `input` and append a new milestone. Nothing is appended on error.
pub fn add_milestone(milestones: &mut Vec<Milestone>, input: NewMilestone) -> Result<Milestone> {
    let mut errors = Vec::new();
    check_title(&input.title, &mut errors);
    let phase = check_phase(&input.phase, &mut errors);
    let status = match input.status.as_deref() {
        Some(s) => check_status(s, &mut errors),
        None => Some(MilestoneStatus::Pending),
    };
    let weight = input.weight.unwrap_or(1.0);
    check_weight(weight, &mut errors);

    let (Some(phase), Some(status), true) = (phase, status, errors.is_empty()) else {
        return Err(StudioError::Validation(errors));
    };

    let mut m = Milestone::new(input.title, phase);
    m.description = input.description.unwrap_or_default();
    m.substep = input.substep;
    m.status = status;
    m.weight = weight;
    m.due_date = input.due_date;
    m.assigned_to = input.assigned_to;
    m.dependencies = dedup(input.dependencies);
    m.notes = input.notes.unwrap_or_default();
    if status == MilestoneStatus::Completed {
        m.completed_date = Some(m.created_at);
    }

    milestones.push(m.clone());
    Ok(m)
}

/// Merge `patch` over the milestone with `id`.
///
/// Completion is stamped only when the patch sets `completed` and the merged
/// record has no completion date yet.
pub fn update_milestone(
    milestones: &mut [Milestone],
    id: &str,
    patch: MilestonePatch,
) -> Result<Milestone> {
    let m = milestones
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| StudioError::MilestoneNotFound(id.to_string()))?;

    let mut errors = Vec::new();
    if let Some(title) = &patch.title {
        check_title(title, &mut errors);
    }
    let phase = patch
        .phase
        .as_deref()
        .and_then(|p| check_phase(p, &mut errors));
    let status = patch
        .status
        .as_deref()
        .and_then(|s| check_status(s, &mut errors));
    if let Some(w) = patch.weight {
        check_weight(w, &mut errors);
    }
    if !errors.is_empty() {
        return Err(StudioError::Validation(errors));
    }

    if let Some(title) = patch.title {
        m.title = title;
    }
    if let Some(description) = patch.description {
        m.description = description;
    }
    if let Some(phase) = phase {
        m.phase = phase;
    }
    if let Some(substep) = patch.substep {
        m.substep = Some(substep);
    }
    if let Some(status) = status {
        m.status = status;
    }
    if let Some(weight) = patch.weight {
        m.weight = weight;
    }
    if let Some(due) = patch.due_date {
        m.due_date = Some(due);
    }
    if let Some(done) = patch.completed_date {
        m.completed_date = Some(done);
    }
    if let Some(assignee) = patch.assigned_to {
        m.assigned_to = Some(assignee);
    }
    if let Some(deps) = patch.dependencies {
        m.dependencies = dedup(deps);
    }
    if let Some(notes) = patch.notes {
        m.notes = notes;
    }

    let now = Utc::now();
    if status == Some(MilestoneStatus::Completed) && m.completed_date.is_none() {
        m.completed_date = Some(now);
    }
    m.updated_at = now;
    Ok(m.clone())
}

/// Remove the milestone with `id`. Returns `false` if it was not present.
pub fn delete_milestone(milestones: &mut Vec<Milestone>, id: &str) -> bool {
    let before = milestones.len();
    milestones.retain(|m| m.id != id);
    milestones.len() < before
}

/// Human-readable summary: "2/5 completed, 1 in progress, 1 blocked"
pub fn summarize(milestones: &[Milestone]) -> String {
    let count = |st: MilestoneStatus| milestones.iter().filter(|m| m.status == st).count();
    format!(
        "{}/{} completed, {} in progress, {} blocked",
        count(MilestoneStatus::Completed),
        milestones.len(),
        count(MilestoneStatus::InProgress),
        count(MilestoneStatus::Blocked)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
