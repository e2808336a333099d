//! Progress roll-up for projects.
//!
//! Two schemes exist. The milestone scheme weights each milestone and only
//! counts exact `completed` status. The substep scheme counts checklist
//! entries, so the overall figure is weighted by substep count rather than
//! being an average of the six phase percentages.

use crate::error::Result;
use crate::milestone::{self, Milestone, MilestonePatch, NewMilestone};
use crate::project::Project;
use crate::substep::{self, Substep, Substeps, ToggleOutcome};
use crate::template::SubstepTemplate;
use crate::types::{MilestoneStatus, Phase, ProgressScheme};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = (200 * part + whole) / (2 * whole);
    pct.min(100) as u8
}

fn percent_f64(part: f64, whole: f64) -> u8 {
    if whole <= 0.0 || !whole.is_finite() {
        return 0;
    }
    (100.0 * part / whole).round().clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub overall: u8,
    pub phases: BTreeMap<Phase, u8>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            overall: 0,
            phases: Phase::all().iter().map(|p| (*p, 0)).collect(),
        }
    }
}

impl Progress {
    pub fn phase(&self, phase: Phase) -> u8 {
        self.phases.get(&phase).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Substep scheme
// ---------------------------------------------------------------------------

pub fn phase_progress_from_substeps(list: &[Substep]) -> u8 {
    percent(list.iter().filter(|s| s.completed).count(), list.len())
}

/// Completed substeps over all substeps across the six phases.
pub fn overall_progress_from_phases(substeps: &Substeps) -> u8 {
    substep::completion_stats(substeps).percentage
}

// ---------------------------------------------------------------------------
// Milestone scheme
// ---------------------------------------------------------------------------

/// Completed weight over total weight. Blocked and in-progress milestones
/// only count toward the total.
pub fn overall_progress(milestones: &[Milestone]) -> u8 {
    weighted(milestones.iter())
}

pub fn phase_progress(milestones: &[Milestone], phase: Phase) -> u8 {
    weighted(milestones.iter().filter(|m| m.phase == phase))
}

fn weighted<'a>(milestones: impl Iterator<Item = &'a Milestone>) -> u8 {
    let (done, total) = milestones.fold((0.0, 0.0), |(done, total), m| {
        if m.status == MilestoneStatus::Completed {
            (done + m.weight, total + m.weight)
        } else {
            (done, total + m.weight)
        }
    });
    percent_f64(done, total)
}

/// Full progress for a project under `scheme`.
pub fn compute(scheme: ProgressScheme, milestones: &[Milestone], substeps: &Substeps) -> Progress {
    match scheme {
        ProgressScheme::Milestones => Progress {
            overall: overall_progress(milestones),
            phases: Phase::all()
                .iter()
                .map(|p| (*p, phase_progress(milestones, *p)))
                .collect(),
        },
        ProgressScheme::Substeps => Progress {
            overall: overall_progress_from_phases(substeps),
            phases: Phase::all()
                .iter()
                .map(|p| (*p, phase_progress_from_substeps(substeps.phase(*p))))
                .collect(),
        },
    }
}

// ---------------------------------------------------------------------------
// ProgressAggregator
// ---------------------------------------------------------------------------

/// Mutations on a project that keep `project.progress` in sync.
///
/// Every operation validates before touching the project, so a rejected call
/// leaves it exactly as it was.
pub struct ProgressAggregator<'t> {
    template: &'t SubstepTemplate,
}

impl<'t> ProgressAggregator<'t> {
    pub fn new(template: &'t SubstepTemplate) -> Self {
        Self { template }
    }

    pub fn initialize_substeps(&self) -> Substeps {
        substep::initialize_substeps(self.template)
    }

    pub fn recompute(&self, project: &mut Project) {
        project.progress = compute(project.scheme, &project.milestones, &project.substeps);
    }

    pub fn add_milestone(&self, project: &mut Project, input: NewMilestone) -> Result<Milestone> {
        let created = milestone::add_milestone(&mut project.milestones, input)?;
        self.finish(project);
        Ok(created)
    }

    pub fn update_milestone(
        &self,
        project: &mut Project,
        id: &str,
        patch: MilestonePatch,
    ) -> Result<Milestone> {
        let updated = milestone::update_milestone(&mut project.milestones, id, patch)?;
        self.finish(project);
        Ok(updated)
    }

    /// Returns whether a milestone was removed. Missing ids are not an error
    /// and leave the project untouched.
    pub fn delete_milestone(&self, project: &mut Project, id: &str) -> bool {
        let removed = milestone::delete_milestone(&mut project.milestones, id);
        if removed {
            self.finish(project);
        }
        removed
    }

    /// Toggle a checklist entry. Projects stored without a checklist are
    /// toggled against a fresh one from the template, which is kept only if
    /// the toggle applies.
    pub fn toggle_substep(&self, project: &mut Project, phase: &str, name: &str) -> ToggleOutcome {
        let fresh;
        let current = if project.substeps.is_empty() {
            fresh = self.initialize_substeps();
            &fresh
        } else {
            &project.substeps
        };
        let outcome = substep::toggle_substep(current, phase, name);
        if let ToggleOutcome::Toggled { substeps, .. } = &outcome {
            project.substeps = substeps.clone();
            self.finish(project);
        }
        outcome
    }

    fn finish(&self, project: &mut Project) {
        self.recompute(project);
        project.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
