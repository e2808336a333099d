use crate::error::{FieldError, Result, StudioError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationKind {
    Meeting,
    Email,
    Message,
    Call,
    #[default]
    Note,
}

impl CommunicationKind {
    pub fn all() -> &'static [CommunicationKind] {
        &[
            CommunicationKind::Meeting,
            CommunicationKind::Email,
            CommunicationKind::Message,
            CommunicationKind::Call,
            CommunicationKind::Note,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommunicationKind::Meeting => "meeting",
            CommunicationKind::Email => "email",
            CommunicationKind::Message => "message",
            CommunicationKind::Call => "call",
            CommunicationKind::Note => "note",
        }
    }
}

/// A logged exchange on a project (meeting notes, emails, internal notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub id: String,
    pub kind: CommunicationKind,
    #[serde(default)]
    pub subject: String,
    pub content: String,
    pub from_user_id: String,
    #[serde(default)]
    pub to_user_id: Option<String>,
    #[serde(default)]
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewCommunication {
    pub kind: Option<String>,
    pub subject: Option<String>,
    pub content: String,
    pub to_user_id: Option<String>,
    pub is_internal: bool,
}

pub fn build(input: NewCommunication, from_user_id: &str) -> Result<Communication> {
    let mut errors = Vec::new();
    if input.content.trim().is_empty() {
        errors.push(FieldError::new("content", "communication content is required"));
    }
    let kind = match input.kind.as_deref() {
        None => Some(CommunicationKind::default()),
        Some(k) => CommunicationKind::all().iter().copied().find(|x| x.as_str() == k),
    };
    if kind.is_none() {
        errors.push(FieldError::new(
            "kind",
            "kind must be one of: meeting, email, message, call, note",
        ));
    }
    let (Some(kind), true) = (kind, errors.is_empty()) else {
        return Err(StudioError::Validation(errors));
    };

    Ok(Communication {
        id: uuid::Uuid::new_v4().to_string(),
        kind,
        subject: input.subject.unwrap_or_default(),
        content: input.content,
        from_user_id: from_user_id.to_string(),
        to_user_id: input.to_user_id,
        is_internal: input.is_internal,
        created_at: Utc::now(),
    })
}
