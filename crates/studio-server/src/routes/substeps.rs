use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use studio_core::progress::ProgressAggregator;
use studio_core::substep::{NoOpReason, ToggleOutcome};

use super::mutate_project;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleBody {
    pub phase: String,
    pub substep_name: String,
}

fn reason_str(reason: NoOpReason) -> &'static str {
    match reason {
        NoOpReason::UnknownPhase => "unknown_phase",
        NoOpReason::EmptyPhase => "empty_phase",
        NoOpReason::UnknownSubstep => "unknown_substep",
    }
}

/// PUT /api/projects/:id/substeps — flip one checklist entry.
///
/// Unknown phases or names leave the project as it was and report why.
pub async fn toggle_substep(
    State(app): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (outcome, project) = mutate_project(&app, &user, id, move |p, template| {
        let outcome =
            ProgressAggregator::new(template).toggle_substep(p, &body.phase, &body.substep_name);
        Ok(match outcome {
            ToggleOutcome::Toggled { completed, .. } => Ok(completed),
            ToggleOutcome::NoOp(reason) => Err(reason),
        })
    })
    .await?;

    let body = match outcome {
        Ok(completed) => {
            tracing::info!(
                project = %project.id,
                completed,
                overall = project.progress.overall,
                "substep toggled"
            );
            serde_json::json!({ "toggled": true, "completed": completed, "project": project })
        }
        Err(reason) => {
            tracing::debug!(project = %project.id, reason = reason_str(reason), "substep toggle ignored");
            serde_json::json!({ "toggled": false, "reason": reason_str(reason), "project": project })
        }
    };
    Ok(Json(body))
}
