use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use studio_core::milestone::{MilestonePatch, NewMilestone};
use studio_core::progress::ProgressAggregator;

use super::mutate_project;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/projects/:id/milestones — append a milestone and recompute progress.
pub async fn add_milestone(
    State(app): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<NewMilestone>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let (milestone, project) = mutate_project(&app, &user, id, move |p, template| {
        Ok(ProgressAggregator::new(template).add_milestone(p, body)?)
    })
    .await?;

    tracing::info!(project = %project.id, milestone = %milestone.id, "milestone added");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "milestone": milestone, "project": project })),
    ))
}

/// PUT /api/projects/:id/milestones/:milestone_id — merge a partial update.
pub async fn update_milestone(
    State(app): State<AppState>,
    user: AuthUser,
    Path((id, milestone_id)): Path<(String, String)>,
    Json(patch): Json<MilestonePatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (milestone, project) = mutate_project(&app, &user, id, move |p, template| {
        Ok(ProgressAggregator::new(template).update_milestone(p, &milestone_id, patch)?)
    })
    .await?;

    tracing::info!(
        project = %project.id,
        milestone = %milestone.id,
        status = %milestone.status,
        overall = project.progress.overall,
        "milestone updated"
    );
    Ok(Json(serde_json::json!({ "milestone": milestone, "project": project })))
}

/// DELETE /api/projects/:id/milestones/:milestone_id — unknown ids are not an error.
pub async fn delete_milestone(
    State(app): State<AppState>,
    user: AuthUser,
    Path((id, milestone_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (removed, project) = mutate_project(&app, &user, id, move |p, template| {
        Ok(ProgressAggregator::new(template).delete_milestone(p, &milestone_id))
    })
    .await?;

    Ok(Json(serde_json::json!({ "removed": removed, "project": project })))
}
