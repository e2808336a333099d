use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use studio_core::communication::NewCommunication;

use super::mutate_project;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/projects/:id/communications — the sender is always the caller.
pub async fn add_communication(
    State(app): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<NewCommunication>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let sender = user.id.clone();
    let (communication, project) = mutate_project(&app, &user, id, move |p, _| {
        Ok(p.add_communication(body, &sender)?)
    })
    .await?;

    tracing::info!(project = %project.id, communication = %communication.id, "communication logged");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "communication": communication, "project": project })),
    ))
}
