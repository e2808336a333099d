use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use studio_core::deliverable::NewDeliverable;

use super::mutate_project;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/projects/:id/deliverables
pub async fn add_deliverable(
    State(app): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<NewDeliverable>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let (deliverable, project) =
        mutate_project(&app, &user, id, move |p, _| Ok(p.add_deliverable(body)?)).await?;

    tracing::info!(project = %project.id, deliverable = %deliverable.id, kind = %deliverable.kind, "deliverable added");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "deliverable": deliverable, "project": project })),
    ))
}
