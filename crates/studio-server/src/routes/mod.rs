pub mod communications;
pub mod deliverables;
pub mod health;
pub mod milestones;
pub mod projects;
pub mod substeps;

use studio_core::project::Project;
use studio_core::template::SubstepTemplate;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Load a project the caller may see.
pub(crate) async fn read_project(
    app: &AppState,
    user: &AuthUser,
    id: String,
) -> Result<Project, AppError> {
    let root = app.root.clone();
    let user = user.clone();
    tokio::task::spawn_blocking(move || {
        let project = Project::load(&root, &id)?;
        user.require_owner_or_admin(&project.owner_id)?;
        Ok::<_, AppError>(project)
    })
    .await
    .map_err(AppError::join)?
}

/// Run one load → mutate → save cycle under the write lock.
///
/// The project is written back only if `f` changed it, and is then stamped
/// with the caller as last updater.
pub(crate) async fn mutate_project<T, F>(
    app: &AppState,
    user: &AuthUser,
    id: String,
    f: F,
) -> Result<(T, Project), AppError>
where
    T: Send + 'static,
    F: FnOnce(&mut Project, &SubstepTemplate) -> Result<T, AppError> + Send + 'static,
{
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let template = app.template.clone();
    let user = user.clone();
    tokio::task::spawn_blocking(move || {
        let mut project = Project::load(&root, &id)?;
        user.require_owner_or_admin(&project.owner_id)?;
        let before = project.clone();
        let out = f(&mut project, &template)?;
        if project != before {
            project.touch(&user.id);
            project.save(&root)?;
        }
        Ok::<_, AppError>((out, project))
    })
    .await
    .map_err(AppError::join)?
}
