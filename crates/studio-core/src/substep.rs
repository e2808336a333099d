use crate::progress::percent;
use crate::template::SubstepTemplate;
use crate::types::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Substep
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substep {
    pub name: String,
    pub completed: bool,
    /// Set iff `completed` is true.
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

impl Substep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            completed: false,
            completed_date: None,
            notes: String::new(),
        }
    }

    fn toggled(&self) -> Self {
        let completed = !self.completed;
        Self {
            completed,
            completed_date: completed.then(Utc::now),
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Substeps
// ---------------------------------------------------------------------------

/// Per-phase checklists. Each phase list sits behind an `Arc`, so a toggle
/// produces a new map that shares every phase it did not touch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Substeps(BTreeMap<Phase, Arc<Vec<Substep>>>);

impl Substeps {
    /// Empty list for phases that were never initialized.
    pub fn phase(&self, phase: Phase) -> &[Substep] {
        self.0.get(&phase).map(|v| v.as_slice()).unwrap_or(&[])
    }

    #[cfg(test)]
    fn phase_arc(&self, phase: Phase) -> Option<&Arc<Vec<Substep>>> {
        self.0.get(&phase)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Phase, &[Substep])> {
        self.0.iter().map(|(p, v)| (*p, v.as_slice()))
    }
}

impl FromIterator<(Phase, Vec<Substep>)> for Substeps {
    fn from_iter<I: IntoIterator<Item = (Phase, Vec<Substep>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(p, v)| (p, Arc::new(v))).collect())
    }
}

/// Fresh checklist for every phase of `template`, all incomplete, template order kept.
pub fn initialize_substeps(template: &SubstepTemplate) -> Substeps {
    Phase::all()
        .iter()
        .map(|phase| {
            let list = template
                .names(*phase)
                .iter()
                .map(Substep::new)
                .collect::<Vec<_>>();
            (*phase, list)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Toggle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    UnknownPhase,
    EmptyPhase,
    UnknownSubstep,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// A new map with the matched entry flipped; `completed` is its new value.
    Toggled { substeps: Substeps, completed: bool },
    /// Nothing matched; the caller's map stands as-is.
    NoOp(NoOpReason),
}

impl ToggleOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, ToggleOutcome::NoOp(_))
    }

    /// Resolve to the resulting map, falling back to `original` on a no-op.
    pub fn into_substeps(self, original: &Substeps) -> Substeps {
        match self {
            ToggleOutcome::Toggled { substeps, .. } => substeps,
            ToggleOutcome::NoOp(_) => original.clone(),
        }
    }
}

/// Flip the completion flag of `substep_name` in `phase`.
///
/// Unknown phases and names are tolerated and reported as [`ToggleOutcome::NoOp`];
/// clients may still send stale phase names.
pub fn toggle_substep(substeps: &Substeps, phase: &str, substep_name: &str) -> ToggleOutcome {
    let Ok(phase) = phase.parse::<Phase>() else {
        return ToggleOutcome::NoOp(NoOpReason::UnknownPhase);
    };
    let Some(list) = substeps.0.get(&phase) else {
        return ToggleOutcome::NoOp(NoOpReason::UnknownPhase);
    };
    if list.is_empty() {
        return ToggleOutcome::NoOp(NoOpReason::EmptyPhase);
    }
    let Some(pos) = list.iter().position(|s| s.name == substep_name) else {
        return ToggleOutcome::NoOp(NoOpReason::UnknownSubstep);
    };

    let mut updated = list.as_ref().clone();
    updated[pos] = list[pos].toggled();
    let completed = updated[pos].completed;

    let mut map = substeps.0.clone();
    map.insert(phase, Arc::new(updated));
    ToggleOutcome::Toggled {
        substeps: Substeps(map),
        completed,
    }
}

pub fn get_substep<'a>(substeps: &'a Substeps, phase: &str, substep_name: &str) -> Option<&'a Substep> {
    let phase = phase.parse::<Phase>().ok()?;
    substeps
        .phase(phase)
        .iter()
        .find(|s| s.name == substep_name)
}

// ---------------------------------------------------------------------------
// Completion stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub total: usize,
    pub completed: usize,
    pub percentage: u8,
}

pub fn completion_stats(substeps: &Substeps) -> CompletionStats {
    let (completed, total) = Phase::all()
        .iter()
        .map(|p| substeps.phase(*p))
        .fold((0, 0), |(c, t), list| {
            (c + list.iter().filter(|s| s.completed).count(), t + list.len())
        });
    CompletionStats {
        total,
        completed,
        percentage: percent(completed, total),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
