use crate::communication::{self, Communication, NewCommunication};
use crate::deliverable::{self, Deliverable, NewDeliverable};
use crate::error::{FieldError, Result, StudioError};
use crate::milestone::Milestone;
use crate::paths;
use crate::progress::{self, Progress};
use crate::substep::{self, Substeps};
use crate::template::SubstepTemplate;
use crate::types::{Phase, ProgressScheme, ProjectStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// One client engagement. Stored as a single YAML document so that deleting
/// the project removes its milestones and checklist with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    pub current_phase: Phase,
    #[serde(default)]
    pub current_substep: String,
    #[serde(default)]
    pub scheme: ProgressScheme,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub substeps: Substeps,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
    #[serde(default)]
    pub communications: Vec<Communication>,
    #[serde(default)]
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_updated_by: Option<String>,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewProject {
    #[serde(alias = "userId")]
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub current_phase: Option<String>,
    pub current_substep: Option<String>,
    pub scheme: Option<String>,
}

/// Editable project fields. Id, owner and creation time are fixed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub current_phase: Option<String>,
    pub current_substep: Option<String>,
    pub admin_notes: Option<String>,
    pub scheme: Option<String>,
}

fn check_name(name: &str, errors: &mut Vec<FieldError>) {
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "project name is required"));
    }
}

fn check_status(status: &str, errors: &mut Vec<FieldError>) -> Option<ProjectStatus> {
    status.parse::<ProjectStatus>().ok().or_else(|| {
        let allowed: Vec<&str> = ProjectStatus::all().iter().map(|s| s.as_str()).collect();
        errors.push(FieldError::new(
            "status",
            format!("status must be one of: {}", allowed.join(", ")),
        ));
        None
    })
}

fn check_phase(field: &str, phase: &str, errors: &mut Vec<FieldError>) -> Option<Phase> {
    phase.parse::<Phase>().ok().or_else(|| {
        let allowed: Vec<&str> = Phase::all().iter().map(|p| p.as_str()).collect();
        errors.push(FieldError::new(
            field,
            format!("phase must be one of: {}", allowed.join(", ")),
        ));
        None
    })
}

fn check_scheme(scheme: &str, errors: &mut Vec<FieldError>) -> Option<ProgressScheme> {
    scheme.parse::<ProgressScheme>().ok().or_else(|| {
        errors.push(FieldError::new(
            "scheme",
            "scheme must be one of: milestones, substeps",
        ));
        None
    })
}

// ---------------------------------------------------------------------------
// Construction and persistence
// ---------------------------------------------------------------------------

impl Project {
    /// Validate `input` and build an unsaved project with a fresh checklist.
    pub fn new(
        input: NewProject,
        template: &SubstepTemplate,
        default_scheme: ProgressScheme,
    ) -> Result<Self> {
        let mut errors = Vec::new();
        check_name(&input.name, &mut errors);
        if input.owner_id.trim().is_empty() {
            errors.push(FieldError::new("ownerId", "owner is required"));
        }
        let status = match input.status.as_deref() {
            Some(s) => check_status(s, &mut errors),
            None => Some(ProjectStatus::default()),
        };
        let phase = match input.current_phase.as_deref() {
            Some(p) => check_phase("currentPhase", p, &mut errors),
            None => Some(Phase::Discovery),
        };
        let scheme = match input.scheme.as_deref() {
            Some(s) => check_scheme(s, &mut errors),
            None => Some(default_scheme),
        };
        let (Some(status), Some(phase), Some(scheme), true) =
            (status, phase, scheme, errors.is_empty())
        else {
            return Err(StudioError::Validation(errors));
        };

        let current_substep = input
            .current_substep
            .or_else(|| template.first(phase).map(str::to_string))
            .unwrap_or_default();
        let substeps = substep::initialize_substeps(template);
        let now = Utc::now();
        let mut project = Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: input.owner_id,
            name: input.name,
            description: input.description.unwrap_or_default(),
            status,
            current_phase: phase,
            current_substep,
            scheme,
            progress: Progress::default(),
            milestones: Vec::new(),
            substeps,
            deliverables: Vec::new(),
            communications: Vec::new(),
            admin_notes: String::new(),
            created_at: now,
            updated_at: now,
            last_updated_by: None,
        };
        project.recompute();
        Ok(project)
    }

    pub fn create(
        root: &Path,
        input: NewProject,
        template: &SubstepTemplate,
        default_scheme: ProgressScheme,
    ) -> Result<Self> {
        paths::ensure_initialized(root)?;
        let project = Self::new(input, template, default_scheme)?;
        project.save(root)?;
        Ok(project)
    }

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        paths::validate_id(id)?;
        let manifest = paths::project_manifest(root, id);
        if !manifest.exists() {
            return Err(StudioError::ProjectNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let project: Project = serde_yaml::from_str(&data)?;
        Ok(project)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        paths::validate_id(&self.id)?;
        let manifest = paths::project_manifest(root, &self.id);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&manifest, data.as_bytes())
    }

    /// All projects, most recently updated first.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = paths::projects_dir(root);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut projects = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            match Self::load(root, &id) {
                Ok(p) => projects.push(p),
                Err(StudioError::ProjectNotFound(_)) | Err(StudioError::InvalidId(_)) => {}
                Err(e) => return Err(e),
            }
        }
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(projects)
    }

    pub fn list_for_owner(root: &Path, owner_id: &str) -> Result<Vec<Self>> {
        let mut projects = Self::list(root)?;
        projects.retain(|p| p.owner_id == owner_id);
        Ok(projects)
    }

    /// Remove the project directory. Milestones and substeps go with it.
    pub fn delete(root: &Path, id: &str) -> Result<()> {
        paths::validate_id(id)?;
        let dir = paths::project_dir(root, id);
        if !paths::project_manifest(root, id).exists() {
            return Err(StudioError::ProjectNotFound(id.to_string()));
        }
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Rebuild `progress` from the source named by `scheme`.
    pub fn recompute(&mut self) {
        self.progress = progress::compute(self.scheme, &self.milestones, &self.substeps);
    }

    pub fn touch(&mut self, user_id: &str) {
        self.updated_at = Utc::now();
        self.last_updated_by = Some(user_id.to_string());
    }

    /// Merge `patch`. Nothing changes if any supplied field is invalid.
    pub fn update(&mut self, patch: ProjectPatch) -> Result<()> {
        let mut errors = Vec::new();
        if let Some(name) = &patch.name {
            check_name(name, &mut errors);
        }
        let status = patch
            .status
            .as_deref()
            .and_then(|s| check_status(s, &mut errors));
        let phase = patch
            .current_phase
            .as_deref()
            .and_then(|p| check_phase("currentPhase", p, &mut errors));
        let scheme = patch
            .scheme
            .as_deref()
            .and_then(|s| check_scheme(s, &mut errors));
        if !errors.is_empty() {
            return Err(StudioError::Validation(errors));
        }

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(phase) = phase {
            self.current_phase = phase;
        }
        if let Some(substep) = patch.current_substep {
            self.current_substep = substep;
        }
        if let Some(notes) = patch.admin_notes {
            self.admin_notes = notes;
        }
        if let Some(scheme) = scheme {
            self.scheme = scheme;
        }
        self.recompute();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move the current-phase pointer. Phase percentages stay derived; they are
    /// never written here.
    pub fn set_phase(
        &mut self,
        phase: &str,
        substep: Option<String>,
        notes: Option<String>,
        template: &SubstepTemplate,
    ) -> Result<()> {
        let mut errors = Vec::new();
        let Some(phase) = check_phase("currentPhase", phase, &mut errors) else {
            return Err(StudioError::Validation(errors));
        };
        self.current_phase = phase;
        self.current_substep = substep
            .or_else(|| template.first(phase).map(str::to_string))
            .unwrap_or_default();
        if let Some(notes) = notes.filter(|n| !n.is_empty()) {
            self.admin_notes = notes;
        }
        self.recompute();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn add_deliverable(&mut self, input: NewDeliverable) -> Result<Deliverable> {
        let d = deliverable::build(input, &self.milestones)?;
        self.deliverables.push(d.clone());
        self.updated_at = Utc::now();
        Ok(d)
    }

    pub fn add_communication(
        &mut self,
        input: NewCommunication,
        from_user_id: &str,
    ) -> Result<Communication> {
        let c = communication::build(input, from_user_id)?;
        self.communications.push(c.clone());
        self.updated_at = Utc::now();
        Ok(c)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
