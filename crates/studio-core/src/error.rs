use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single violated input field, reported back to API clients verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("not initialized: run 'studio init'")]
    NotInitialized,

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("milestone not found: {0}")]
    MilestoneNotFound(String),

    #[error("invalid id '{0}': must be 1-64 characters of [A-Za-z0-9_-]")]
    InvalidId(String),

    #[error("invalid phase: {0}")]
    InvalidPhase(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid progress scheme: {0}")]
    InvalidScheme(String),

    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StudioError {
    /// Field errors carried by a validation failure; empty for every other variant.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            StudioError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, StudioError>;
