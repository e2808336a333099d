use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use studio_core::error::StudioError;

// ---------------------------------------------------------------------------
// Sentinels for statuses StudioError does not model
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 401 through the `anyhow::Error` chain.
#[derive(Debug)]
struct UnauthorizedError(String);

impl std::fmt::Display for UnauthorizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UnauthorizedError {}

/// Carries an explicit HTTP 403 through the `anyhow::Error` chain.
#[derive(Debug)]
struct ForbiddenError(String);

impl std::fmt::Display for ForbiddenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ForbiddenError {}

#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(UnauthorizedError(msg.into()).into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(ForbiddenError(msg.into()).into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    pub fn join(e: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(e) = self.0.downcast_ref::<UnauthorizedError>() {
            let body = serde_json::json!({ "error": e.0.clone() });
            return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
        }
        if let Some(e) = self.0.downcast_ref::<ForbiddenError>() {
            let body = serde_json::json!({ "error": e.0.clone() });
            return (StatusCode::FORBIDDEN, axum::Json(body)).into_response();
        }
        if let Some(e) = self.0.downcast_ref::<NotFoundError>() {
            let body = serde_json::json!({ "error": e.0.clone() });
            return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
        }

        if let Some(e) = self.0.downcast_ref::<StudioError>() {
            let status = match e {
                StudioError::NotInitialized
                | StudioError::InvalidId(_)
                | StudioError::InvalidPhase(_)
                | StudioError::InvalidStatus(_)
                | StudioError::InvalidScheme(_)
                | StudioError::Validation(_) => StatusCode::BAD_REQUEST,
                StudioError::ProjectNotFound(_) | StudioError::MilestoneNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                StudioError::Io(_) | StudioError::Yaml(_) | StudioError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            if status.is_server_error() {
                tracing::error!(error = %e, "request failed");
            }
            let mut body = serde_json::json!({ "error": e.to_string() });
            if let StudioError::Validation(fields) = e {
                body["errors"] = serde_json::json!(fields);
            }
            return (status, axum::Json(body)).into_response();
        }

        tracing::error!(error = %self.0, "request failed");
        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
