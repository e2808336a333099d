use std::path::PathBuf;
use std::sync::Arc;
use studio_core::config::{Config, ProjectsConfig, ServerConfig};
use studio_core::query::PageLimits;
use studio_core::template::SubstepTemplate;
use studio_core::types::ProgressScheme;
use studio_core::StudioError;
use tokio::sync::Mutex;

use crate::auth::AuthConfig;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub template: Arc<SubstepTemplate>,
    pub auth: Arc<AuthConfig>,
    pub default_scheme: ProgressScheme,
    pub page_limits: PageLimits,
    /// CORS origins from config.yaml; empty allows any origin.
    pub allowed_origins: Arc<Vec<String>>,
    /// Held across every load → mutate → save cycle.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(root: PathBuf, auth: AuthConfig) -> Self {
        let (projects, server) = load_settings(&root);
        Self {
            root,
            template: Arc::new(SubstepTemplate::standard()),
            auth: Arc::new(auth),
            default_scheme: projects.default_scheme,
            page_limits: projects.page_limits(),
            allowed_origins: Arc::new(server.allowed_origins),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// A root without config still serves; requests report NotInitialized.
/// An unreadable config falls back to defaults but is logged.
fn load_settings(root: &std::path::Path) -> (ProjectsConfig, ServerConfig) {
    match Config::load(root) {
        Ok(cfg) => (cfg.projects, cfg.server),
        Err(StudioError::NotInitialized) => Default::default(),
        Err(e) => {
            tracing::warn!(error = %e, "config.yaml unreadable, using defaults");
            Default::default()
        }
    }
}
