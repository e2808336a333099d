use crate::error::{Result, StudioError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const STUDIO_DIR: &str = ".studio";
pub const PROJECTS_DIR: &str = ".studio/projects";
pub const CONFIG_FILE: &str = ".studio/config.yaml";
pub const MANIFEST_FILE: &str = "manifest.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn studio_dir(root: &Path) -> PathBuf {
    root.join(STUDIO_DIR)
}

pub fn projects_dir(root: &Path) -> PathBuf {
    root.join(PROJECTS_DIR)
}

pub fn project_dir(root: &Path, id: &str) -> PathBuf {
    projects_dir(root).join(id)
}

pub fn project_manifest(root: &Path, id: &str) -> PathBuf {
    project_dir(root, id).join(MANIFEST_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn ensure_initialized(root: &Path) -> Result<()> {
    if !studio_dir(root).is_dir() {
        return Err(StudioError::NotInitialized);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap())
}

/// Ids become directory names, so anything outside the safe alphabet is
/// rejected before a path is built from it.
pub fn validate_id(id: &str) -> Result<()> {
    if !id_re().is_match(id) {
        return Err(StudioError::InvalidId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
