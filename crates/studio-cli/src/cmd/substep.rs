use super::CLI_ACTOR;
use crate::output::{print_json, print_table, progress_bar};
use anyhow::Context;
use clap::Subcommand;
use studio_core::{
    progress::ProgressAggregator,
    project::Project,
    substep::{completion_stats, NoOpReason, ToggleOutcome},
    template::SubstepTemplate,
    types::Phase,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum SubstepSubcommand {
    /// Flip a checklist entry between done and not done
    Toggle {
        project: String,
        phase: String,
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Show a project's checklist
    List {
        project: String,
        /// Only this phase
        #[arg(long)]
        phase: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: SubstepSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SubstepSubcommand::Toggle {
            project,
            phase,
            name,
        } => toggle(root, &project, &phase, &name.join(" "), json),
        SubstepSubcommand::List { project, phase } => list(root, &project, phase.as_deref(), json),
    }
}

fn reason_str(reason: NoOpReason) -> &'static str {
    match reason {
        NoOpReason::UnknownPhase => "unknown_phase",
        NoOpReason::EmptyPhase => "empty_phase",
        NoOpReason::UnknownSubstep => "unknown_substep",
    }
}

fn toggle(root: &Path, project_id: &str, phase: &str, name: &str, json: bool) -> anyhow::Result<()> {
    let mut project =
        Project::load(root, project_id).with_context(|| format!("project '{project_id}' not found"))?;
    let template = SubstepTemplate::standard();
    let outcome = ProgressAggregator::new(&template).toggle_substep(&mut project, phase, name);

    match outcome {
        ToggleOutcome::Toggled { completed, .. } => {
            project.touch(CLI_ACTOR);
            project.save(root).context("failed to save project")?;
            if json {
                print_json(&serde_json::json!({
                    "toggled": true,
                    "completed": completed,
                    "progress": project.progress,
                }))?;
            } else {
                let state = if completed { "done" } else { "not done" };
                println!("{phase} / {name}: {state}");
                println!("  overall progress: {}", progress_bar(project.progress.overall));
            }
        }
        ToggleOutcome::NoOp(reason) => {
            if json {
                print_json(&serde_json::json!({
                    "toggled": false,
                    "reason": reason_str(reason),
                }))?;
            } else {
                println!("Nothing toggled ({}): {phase} / {name}", reason_str(reason));
            }
        }
    }
    Ok(())
}

fn list(root: &Path, project_id: &str, phase: Option<&str>, json: bool) -> anyhow::Result<()> {
    let project =
        Project::load(root, project_id).with_context(|| format!("project '{project_id}' not found"))?;
    let only = phase
        .map(|p| p.parse::<Phase>())
        .transpose()
        .with_context(|| format!("unknown phase '{}'", phase.unwrap_or_default()))?;

    if json {
        return match only {
            Some(p) => print_json(&project.substeps.phase(p)),
            None => print_json(&project.substeps),
        };
    }

    let rows: Vec<Vec<String>> = project
        .substeps
        .iter()
        .filter(|(p, _)| only.map_or(true, |o| o == *p))
        .flat_map(|(p, list)| {
            list.iter().map(move |s| {
                vec![
                    p.to_string(),
                    if s.completed { "[x]" } else { "[ ]" }.to_string(),
                    s.name.clone(),
                    s.completed_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                ]
            })
        })
        .collect();

    if rows.is_empty() {
        println!("No substeps.");
        return Ok(());
    }
    print_table(&["PHASE", "DONE", "SUBSTEP", "COMPLETED"], &rows);

    let stats = completion_stats(&project.substeps);
    println!(
        "\n{}/{} complete {}",
        stats.completed,
        stats.total,
        progress_bar(stats.percentage)
    );
    Ok(())
}
