use super::CLI_ACTOR;
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use studio_core::{
    milestone::{self, MilestonePatch, NewMilestone},
    progress::ProgressAggregator,
    project::Project,
    template::SubstepTemplate,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum MilestoneSubcommand {
    /// Add a milestone to a project
    Add {
        project: String,
        #[arg(required = true)]
        title: Vec<String>,
        /// Phase the milestone belongs to
        #[arg(long)]
        phase: String,
        /// pending, in-progress, completed or blocked
        #[arg(long)]
        status: Option<String>,
        /// Relative weight in milestone-based progress (default 1)
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        substep: Option<String>,
        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_date)]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        assigned_to: Option<String>,
        /// Comma-separated milestone ids this one depends on
        #[arg(long)]
        depends: Option<String>,
    },
    /// Update milestone fields
    Update {
        project: String,
        milestone_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        phase: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long, value_parser = parse_date)]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a milestone (no error if it is already gone)
    Remove {
        project: String,
        milestone_id: String,
    },
    /// List a project's milestones
    List { project: String },
}

pub fn run(root: &Path, subcmd: MilestoneSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MilestoneSubcommand::Add {
            project,
            title,
            phase,
            status,
            weight,
            substep,
            due,
            assigned_to,
            depends,
        } => add(
            root,
            &project,
            NewMilestone {
                title: title.join(" "),
                phase,
                status,
                weight,
                substep,
                due_date: due,
                assigned_to,
                dependencies: depends.as_deref().map(split_ids).unwrap_or_default(),
                ..Default::default()
            },
            json,
        ),
        MilestoneSubcommand::Update {
            project,
            milestone_id,
            title,
            phase,
            status,
            weight,
            due,
            assigned_to,
            notes,
        } => update(
            root,
            &project,
            &milestone_id,
            MilestonePatch {
                title,
                phase,
                status,
                weight,
                due_date: due,
                assigned_to,
                notes,
                ..Default::default()
            },
            json,
        ),
        MilestoneSubcommand::Remove {
            project,
            milestone_id,
        } => remove(root, &project, &milestone_id, json),
        MilestoneSubcommand::List { project } => list(root, &project, json),
    }
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid date '{s}': {e}"))
}

fn split_ids(s: &str) -> Vec<String> {
    s.split(',')
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

fn load(root: &Path, id: &str) -> anyhow::Result<Project> {
    Project::load(root, id).with_context(|| format!("project '{id}' not found"))
}

fn save(root: &Path, project: &mut Project) -> anyhow::Result<()> {
    project.touch(CLI_ACTOR);
    project.save(root).context("failed to save project")
}

fn add(root: &Path, project_id: &str, input: NewMilestone, json: bool) -> anyhow::Result<()> {
    let mut project = load(root, project_id)?;
    let template = SubstepTemplate::standard();
    let created = ProgressAggregator::new(&template).add_milestone(&mut project, input)?;
    save(root, &mut project)?;

    if json {
        print_json(&serde_json::json!({ "milestone": created, "progress": project.progress }))?;
    } else {
        println!("Added milestone [{}]: {}", created.id, created.title);
        println!("  overall progress: {}%", project.progress.overall);
    }
    Ok(())
}

fn update(
    root: &Path,
    project_id: &str,
    milestone_id: &str,
    patch: MilestonePatch,
    json: bool,
) -> anyhow::Result<()> {
    let mut project = load(root, project_id)?;
    let template = SubstepTemplate::standard();
    let updated =
        ProgressAggregator::new(&template).update_milestone(&mut project, milestone_id, patch)?;
    save(root, &mut project)?;

    if json {
        print_json(&serde_json::json!({ "milestone": updated, "progress": project.progress }))?;
    } else {
        println!("Updated milestone [{}] ({})", updated.id, updated.status);
        println!("  overall progress: {}%", project.progress.overall);
    }
    Ok(())
}

fn remove(root: &Path, project_id: &str, milestone_id: &str, json: bool) -> anyhow::Result<()> {
    let mut project = load(root, project_id)?;
    let template = SubstepTemplate::standard();
    let removed = ProgressAggregator::new(&template).delete_milestone(&mut project, milestone_id);
    if removed {
        save(root, &mut project)?;
    }

    if json {
        print_json(&serde_json::json!({ "id": milestone_id, "removed": removed }))?;
    } else if removed {
        println!("Removed milestone [{milestone_id}]");
    } else {
        println!("Milestone [{milestone_id}] not present; nothing removed");
    }
    Ok(())
}

fn list(root: &Path, project_id: &str, json: bool) -> anyhow::Result<()> {
    let project = load(root, project_id)?;

    if json {
        return print_json(&project.milestones);
    }

    if project.milestones.is_empty() {
        println!("No milestones.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = project
        .milestones
        .iter()
        .map(|m| {
            vec![
                m.id.clone(),
                m.phase.to_string(),
                m.status.to_string(),
                format!("{}", m.weight),
                m.due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                m.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "PHASE", "STATUS", "WEIGHT", "DUE", "TITLE"], &rows);
    println!("\n{}", milestone::summarize(&project.milestones));
    Ok(())
}
