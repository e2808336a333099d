use crate::error::{FieldError, Result, StudioError};
use crate::milestone::Milestone;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliverableKind {
    #[default]
    Document,
    Design,
    Code,
    Test,
    Deployment,
}

impl DeliverableKind {
    pub fn all() -> &'static [DeliverableKind] {
        &[
            DeliverableKind::Document,
            DeliverableKind::Design,
            DeliverableKind::Code,
            DeliverableKind::Test,
            DeliverableKind::Deployment,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeliverableKind::Document => "document",
            DeliverableKind::Design => "design",
            DeliverableKind::Code => "code",
            DeliverableKind::Test => "test",
            DeliverableKind::Deployment => "deployment",
        }
    }
}

impl fmt::Display for DeliverableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliverableStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Review,
}

impl DeliverableStatus {
    pub fn all() -> &'static [DeliverableStatus] {
        &[
            DeliverableStatus::Pending,
            DeliverableStatus::InProgress,
            DeliverableStatus::Completed,
            DeliverableStatus::Review,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeliverableStatus::Pending => "pending",
            DeliverableStatus::InProgress => "in-progress",
            DeliverableStatus::Completed => "completed",
            DeliverableStatus::Review => "review",
        }
    }
}

impl fmt::Display for DeliverableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliverable {
    pub id: String,
    #[serde(default)]
    pub milestone_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: DeliverableKind,
    pub status: DeliverableStatus,
    #[serde(default)]
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewDeliverable {
    pub milestone_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub file_url: Option<String>,
}

/// Build a deliverable from `input`. A referenced milestone must exist in `milestones`.
pub fn build(input: NewDeliverable, milestones: &[Milestone]) -> Result<Deliverable> {
    let mut errors = Vec::new();
    if input.title.trim().is_empty() {
        errors.push(FieldError::new("title", "deliverable title is required"));
    }
    let kind = match input.kind.as_deref() {
        None => Some(DeliverableKind::default()),
        Some(k) => {
            let found = DeliverableKind::all().iter().copied().find(|x| x.as_str() == k);
            if found.is_none() {
                errors.push(FieldError::new(
                    "kind",
                    "kind must be one of: document, design, code, test, deployment",
                ));
            }
            found
        }
    };
    let status = match input.status.as_deref() {
        None => Some(DeliverableStatus::default()),
        Some(s) => {
            let found = DeliverableStatus::all().iter().copied().find(|x| x.as_str() == s);
            if found.is_none() {
                errors.push(FieldError::new(
                    "status",
                    "status must be one of: pending, in-progress, completed, review",
                ));
            }
            found
        }
    };
    if let Some(mid) = &input.milestone_id {
        if !milestones.iter().any(|m| &m.id == mid) {
            errors.push(FieldError::new(
                "milestoneId",
                format!("no milestone '{mid}' in this project"),
            ));
        }
    }

    let (Some(kind), Some(status), true) = (kind, status, errors.is_empty()) else {
        return Err(StudioError::Validation(errors));
    };

    let now = Utc::now();
    Ok(Deliverable {
        id: uuid::Uuid::new_v4().to_string(),
        milestone_id: input.milestone_id,
        title: input.title,
        description: input.description.unwrap_or_default(),
        kind,
        status,
        file_url: input.file_url,
        created_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Phase;

    #[test]
    fn defaults_to_pending_document() {
        let d = build(
            NewDeliverable {
                title: "Brand guide".into(),
                ..Default::default()
            },
            &[],
        )
        .unwrap();
        assert_eq!(d.kind, DeliverableKind::Document);
        assert_eq!(d.status, DeliverableStatus::Pending);
    }

    #[test]
    fn milestone_reference_must_exist() {
        let m = Milestone::new("Mockups", Phase::Design);
        let ok = build(
            NewDeliverable {
                title: "Figma file".into(),
                kind: Some("design".into()),
                milestone_id: Some(m.id.clone()),
                ..Default::default()
            },
            std::slice::from_ref(&m),
        );
        assert!(ok.is_ok());

        let err = build(
            NewDeliverable {
                title: "Figma file".into(),
                milestone_id: Some("ghost".into()),
                ..Default::default()
            },
            &[m],
        )
        .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "milestoneId");
    }

    #[test]
    fn rejects_unknown_kind_and_blank_title() {
        let err = build(
            NewDeliverable {
                title: "".into(),
                kind: Some("video".into()),
                ..Default::default()
            },
            &[],
        )
        .unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "kind"]);
    }
}
