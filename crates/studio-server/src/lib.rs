pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use auth::AuthConfig;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf, auth: AuthConfig) -> Router {
    let app_state = state::AppState::new(root, auth);

    let cors = CorsLayer::new()
        .allow_origin(allow_origin(&app_state.allowed_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        // Admin views
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route("/api/projects/stats", get(routes::projects::project_stats))
        .route(
            "/api/projects/user/{user_id}",
            get(routes::projects::list_user_projects),
        )
        // Projects
        .route(
            "/api/projects/{id}",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/api/projects/{id}/phase", put(routes::projects::set_phase))
        .route(
            "/api/projects/{id}/substeps",
            put(routes::substeps::toggle_substep),
        )
        // Milestones
        .route(
            "/api/projects/{id}/milestones",
            post(routes::milestones::add_milestone),
        )
        .route(
            "/api/projects/{id}/milestones/{milestone_id}",
            put(routes::milestones::update_milestone)
                .delete(routes::milestones::delete_milestone),
        )
        // Activity
        .route(
            "/api/projects/{id}/deliverables",
            post(routes::deliverables::add_deliverable),
        )
        .route(
            "/api/projects/{id}/communications",
            post(routes::communications::add_communication),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/api/health", get(routes::health::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Any origin when the list is empty; otherwise exactly the listed ones.
fn allow_origin(origins: &[String]) -> AllowOrigin {
    if origins.is_empty() {
        return AllowOrigin::any();
    }
    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    AllowOrigin::list(values)
}

/// Start the API server.
pub async fn serve(root: PathBuf, port: u16, auth: AuthConfig) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, auth).await
}

/// Start the API server on a pre-bound listener.
///
/// Lets the caller read the actual port first when binding to port 0.
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    auth: AuthConfig,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root, auth);

    tracing::info!("studio API listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
