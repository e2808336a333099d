use super::CLI_ACTOR;
use crate::output::{print_json, print_table, progress_bar};
use anyhow::Context;
use clap::Subcommand;
use studio_core::{
    config::Config,
    paths,
    project::{NewProject, Project},
    query::{ProjectQuery, ProjectStats},
    template::SubstepTemplate,
    types::Phase,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Create a new project
    Create {
        #[arg(required = true)]
        name: Vec<String>,
        /// Owning client user id
        #[arg(long)]
        owner: String,
        #[arg(long)]
        description: Option<String>,
        /// Progress source: milestones or substeps (default from config.yaml)
        #[arg(long)]
        scheme: Option<String>,
        /// Starting phase (default: discovery)
        #[arg(long)]
        phase: Option<String>,
    },
    /// List projects
    List {
        /// Only projects owned by this user
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        phase: Option<String>,
        /// Case-insensitive match on name, description and owner
        #[arg(long)]
        search: Option<String>,
        /// updatedAt, createdAt, name or progress
        #[arg(long)]
        sort_by: Option<String>,
        /// asc or desc
        #[arg(long)]
        sort_order: Option<String>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show a project with per-phase progress
    Info { id: String },
    /// Move a project's current-phase pointer
    Phase {
        id: String,
        phase: String,
        #[arg(long)]
        substep: Option<String>,
        /// Replaces the admin notes when non-empty
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a project and everything in it
    Delete { id: String },
    /// Counts by status and phase, plus average progress
    Stats,
}

pub fn run(root: &Path, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::Create {
            name,
            owner,
            description,
            scheme,
            phase,
        } => create(
            root,
            NewProject {
                owner_id: owner,
                name: name.join(" "),
                description,
                current_phase: phase,
                scheme,
                ..Default::default()
            },
            json,
        ),
        ProjectSubcommand::List {
            owner,
            status,
            phase,
            search,
            sort_by,
            sort_order,
            page,
            limit,
        } => list(
            root,
            owner.as_deref(),
            ProjectQuery {
                search,
                status,
                phase,
                sort_by,
                sort_order,
                page,
                limit,
            },
            json,
        ),
        ProjectSubcommand::Info { id } => info(root, &id, json),
        ProjectSubcommand::Phase {
            id,
            phase,
            substep,
            notes,
        } => set_phase(root, &id, &phase, substep, notes, json),
        ProjectSubcommand::Delete { id } => delete(root, &id, json),
        ProjectSubcommand::Stats => stats(root, json),
    }
}

fn create(root: &Path, input: NewProject, json: bool) -> anyhow::Result<()> {
    paths::ensure_initialized(root)?;
    let config = Config::load(root).context("failed to read config.yaml")?;
    let template = SubstepTemplate::standard();

    let mut project = Project::new(input, &template, config.projects.default_scheme)?;
    project.last_updated_by = Some(CLI_ACTOR.to_string());
    project.save(root).context("failed to save project")?;

    if json {
        print_json(&project)?;
    } else {
        println!("Created project '{}' [{}]", project.name, project.id);
        println!(
            "  owner: {}  phase: {}  scheme: {}",
            project.owner_id, project.current_phase, project.scheme
        );
    }
    Ok(())
}

fn list(
    root: &Path,
    owner: Option<&str>,
    query: ProjectQuery,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to read config.yaml")?;
    let projects = match owner {
        Some(o) => Project::list_for_owner(root, o)?,
        None => Project::list(root)?,
    };
    let page = query.run(projects, config.projects.page_limits())?;

    if json {
        return print_json(&page);
    }

    if page.projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = page
        .projects
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                p.owner_id.clone(),
                p.status.to_string(),
                p.current_phase.to_string(),
                progress_bar(p.progress.overall),
            ]
        })
        .collect();
    print_table(
        &["ID", "NAME", "OWNER", "STATUS", "PHASE", "PROGRESS"],
        &rows,
    );
    let pg = page.pagination;
    if pg.pages > 1 {
        println!("\npage {} of {} ({} projects)", pg.page, pg.pages, pg.total);
    }
    Ok(())
}

fn info(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let project = Project::load(root, id).with_context(|| format!("project '{id}' not found"))?;

    if json {
        return print_json(&project);
    }

    println!("{} [{}]", project.name, project.id);
    if !project.description.is_empty() {
        println!("{}", project.description);
    }
    println!();
    println!("Owner:    {}", project.owner_id);
    println!("Status:   {}", project.status);
    println!("Phase:    {}", project.current_phase);
    if !project.current_substep.is_empty() {
        println!("Substep:  {}", project.current_substep);
    }
    println!("Scheme:   {}", project.scheme);
    println!("Overall:  {}", progress_bar(project.progress.overall));
    println!();

    for phase in Phase::all() {
        let marker = if *phase == project.current_phase {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<12} {}",
            phase.as_str(),
            progress_bar(project.progress.phase(*phase))
        );
    }

    println!(
        "\n{} milestones, {} deliverables, {} communications",
        project.milestones.len(),
        project.deliverables.len(),
        project.communications.len()
    );
    if !project.admin_notes.is_empty() {
        println!("\nNotes: {}", project.admin_notes);
    }
    Ok(())
}

fn set_phase(
    root: &Path,
    id: &str,
    phase: &str,
    substep: Option<String>,
    notes: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut project =
        Project::load(root, id).with_context(|| format!("project '{id}' not found"))?;
    let template = SubstepTemplate::standard();
    project.set_phase(phase, substep, notes, &template)?;
    project.touch(CLI_ACTOR);
    project.save(root).context("failed to save project")?;

    if json {
        print_json(&project)?;
    } else {
        println!(
            "Project [{id}] now in {} ({})",
            project.current_phase,
            if project.current_substep.is_empty() {
                "no substep"
            } else {
                project.current_substep.as_str()
            }
        );
    }
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    Project::delete(root, id).with_context(|| format!("failed to delete project '{id}'"))?;

    if json {
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
    } else {
        println!("Deleted project [{id}]");
    }
    Ok(())
}

fn stats(root: &Path, json: bool) -> anyhow::Result<()> {
    let projects = Project::list(root)?;
    let stats = ProjectStats::compute(&projects);

    if json {
        return print_json(&stats);
    }

    println!("Projects: {}", stats.total_projects);
    println!("Average progress: {:.1}%", stats.average_progress);

    if !stats.status_counts.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = stats
            .status_counts
            .iter()
            .map(|(k, v)| vec![k.clone(), v.to_string()])
            .collect();
        print_table(&["STATUS", "COUNT"], &rows);
    }
    if !stats.phase_counts.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = stats
            .phase_counts
            .iter()
            .map(|(k, v)| vec![k.clone(), v.to_string()])
            .collect();
        print_table(&["PHASE", "COUNT"], &rows);
    }
    Ok(())
}
