use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use studio_core::project::{NewProject, Project, ProjectPatch};
use studio_core::query::{ProjectQuery, ProjectStats};

use super::{mutate_project, read_project};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/projects — admin listing with search, filters and pagination.
pub async fn list_projects(
    State(app): State<AppState>,
    user: AuthUser,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    user.require_admin()?;
    let root = app.root.clone();
    let limits = app.page_limits;
    let page = tokio::task::spawn_blocking(move || {
        studio_core::paths::ensure_initialized(&root)?;
        let projects = Project::list(&root)?;
        query.run(projects, limits)
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(serde_json::json!(page)))
}

/// GET /api/projects/stats — counts by status and phase, average progress.
pub async fn project_stats(
    State(app): State<AppState>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    user.require_admin()?;
    let root = app.root.clone();
    let stats = tokio::task::spawn_blocking(move || {
        studio_core::paths::ensure_initialized(&root)?;
        let projects = Project::list(&root)?;
        Ok::<_, studio_core::StudioError>(ProjectStats::compute(&projects))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(serde_json::json!({ "statistics": stats })))
}

/// GET /api/projects/user/:user_id — one user's projects.
pub async fn list_user_projects(
    State(app): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if user.id != user_id && !user.is_admin() {
        return Err(AppError::forbidden("cannot list another user's projects"));
    }
    let root = app.root.clone();
    let projects = tokio::task::spawn_blocking(move || {
        studio_core::paths::ensure_initialized(&root)?;
        Project::list_for_owner(&root, &user_id)
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(serde_json::json!({ "projects": projects })))
}

/// POST /api/projects — create a project owned by the caller.
///
/// Admins may name another owner through `ownerId`.
pub async fn create_project(
    State(app): State<AppState>,
    user: AuthUser,
    Json(mut body): Json<NewProject>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if body.owner_id.is_empty() {
        body.owner_id = user.id.clone();
    } else if body.owner_id != user.id && !user.is_admin() {
        return Err(AppError::forbidden("only admins may create projects for other users"));
    }

    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let template = app.template.clone();
    let scheme = app.default_scheme;
    let caller = user.id.clone();
    let project = tokio::task::spawn_blocking(move || {
        studio_core::paths::ensure_initialized(&root)?;
        let mut project = Project::new(body, &template, scheme)?;
        project.last_updated_by = Some(caller);
        project.save(&root)?;
        Ok::<_, studio_core::StudioError>(project)
    })
    .await
    .map_err(AppError::join)??;

    tracing::info!(project = %project.id, owner = %project.owner_id, "project created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "project": project })),
    ))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(app): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let project = read_project(&app, &user, id).await?;
    Ok(Json(serde_json::json!({ "project": project })))
}

/// PUT /api/projects/:id — patch editable fields.
pub async fn update_project(
    State(app): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ((), project) = mutate_project(&app, &user, id, move |p, _| {
        p.update(patch)?;
        Ok(())
    })
    .await?;
    Ok(Json(serde_json::json!({ "project": project })))
}

/// DELETE /api/projects/:id — removes milestones and checklist with it.
pub async fn delete_project(
    State(app): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let deleted = id.clone();
    tokio::task::spawn_blocking(move || {
        let project = Project::load(&root, &id)?;
        user.require_owner_or_admin(&project.owner_id)?;
        Project::delete(&root, &id)?;
        Ok::<_, AppError>(())
    })
    .await
    .map_err(AppError::join)??;

    tracing::info!(project = %deleted, "project deleted");
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPhaseBody {
    pub current_phase: String,
    #[serde(default)]
    pub current_substep: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// PUT /api/projects/:id/phase — move the current-phase pointer.
pub async fn set_phase(
    State(app): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<SetPhaseBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ((), project) = mutate_project(&app, &user, id, move |p, template| {
        p.set_phase(&body.current_phase, body.current_substep, body.notes, template)?;
        Ok(())
    })
    .await?;
    tracing::info!(project = %project.id, phase = %project.current_phase, "phase changed");
    Ok(Json(serde_json::json!({ "project": project })))
}
