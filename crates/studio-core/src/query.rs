use crate::error::{FieldError, Result, StudioError};
use crate::project::Project;
use crate::types::{Phase, ProjectStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    UpdatedAt,
    CreatedAt,
    Name,
    Progress,
}

impl std::str::FromStr for SortBy {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s {
            "updatedAt" => Ok(SortBy::UpdatedAt),
            "createdAt" => Ok(SortBy::CreatedAt),
            "name" => Ok(SortBy::Name),
            "progress" => Ok(SortBy::Progress),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

// ---------------------------------------------------------------------------
// ProjectQuery
// ---------------------------------------------------------------------------

/// Bounds applied to `limit`. Loaded from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 1000,
        }
    }
}

/// Admin listing filters, as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub phase: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectPage {
    pub projects: Vec<Project>,
    pub pagination: Pagination,
}

impl ProjectQuery {
    /// Filter, sort and slice `projects`. Empty filter strings match everything.
    pub fn run(&self, projects: Vec<Project>, limits: PageLimits) -> Result<ProjectPage> {
        let mut errors = Vec::new();
        let status = nonempty(&self.status).and_then(|s| {
            s.parse::<ProjectStatus>()
                .map_err(|_| errors.push(FieldError::new("status", "unknown project status")))
                .ok()
        });
        let phase = nonempty(&self.phase).and_then(|p| {
            p.parse::<Phase>()
                .map_err(|_| errors.push(FieldError::new("phase", "unknown phase")))
                .ok()
        });
        let sort_by = match nonempty(&self.sort_by) {
            Some(s) => s.parse::<SortBy>().unwrap_or_else(|_| {
                errors.push(FieldError::new(
                    "sortBy",
                    "sortBy must be one of: updatedAt, createdAt, name, progress",
                ));
                SortBy::default()
            }),
            None => SortBy::default(),
        };
        let order = match nonempty(&self.sort_order) {
            Some("asc") => SortOrder::Asc,
            Some("desc") | None => SortOrder::Desc,
            Some(_) => {
                errors.push(FieldError::new("sortOrder", "sortOrder must be asc or desc"));
                SortOrder::Desc
            }
        };
        if !errors.is_empty() {
            return Err(StudioError::Validation(errors));
        }

        let needle = nonempty(&self.search).map(str::to_lowercase);
        let mut matched: Vec<Project> = projects
            .into_iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .filter(|p| phase.map_or(true, |ph| p.current_phase == ph))
            .filter(|p| needle.as_deref().map_or(true, |n| matches_search(p, n)))
            .collect();

        matched.sort_by(|a, b| {
            let ord = compare(a, b, sort_by);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let limit = self
            .limit
            .unwrap_or(limits.default_limit)
            .clamp(1, limits.max_limit.max(1));
        let page = self.page.unwrap_or(1).max(1);
        let total = matched.len();
        let pages = total.div_ceil(limit);
        let projects = matched
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(ProjectPage {
            projects,
            pagination: Pagination {
                page,
                limit,
                total,
                pages,
            },
        })
    }
}

fn nonempty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn matches_search(p: &Project, needle: &str) -> bool {
    [&p.name, &p.description, &p.owner_id]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

fn compare(a: &Project, b: &Project, by: SortBy) -> Ordering {
    match by {
        SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortBy::Progress => a.progress.overall.cmp(&b.progress.overall),
    }
}

// ---------------------------------------------------------------------------
// ProjectStats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub status_counts: BTreeMap<String, usize>,
    pub phase_counts: BTreeMap<String, usize>,
    /// Mean of `progress.overall`; 0 with no projects.
    pub average_progress: f64,
    pub total_projects: usize,
}

impl ProjectStats {
    pub fn compute(projects: &[Project]) -> Self {
        let mut status_counts = BTreeMap::new();
        let mut phase_counts = BTreeMap::new();
        let mut sum = 0u64;
        for p in projects {
            *status_counts.entry(p.status.as_str().to_string()).or_insert(0) += 1;
            *phase_counts
                .entry(p.current_phase.as_str().to_string())
                .or_insert(0) += 1;
            sum += u64::from(p.progress.overall);
        }
        let average_progress = if projects.is_empty() {
            0.0
        } else {
            sum as f64 / projects.len() as f64
        };
        Self {
            status_counts,
            phase_counts,
            average_progress,
            total_projects: projects.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
