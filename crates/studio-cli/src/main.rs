mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    milestone::MilestoneSubcommand, project::ProjectSubcommand, substep::SubstepSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "studio",
    about = "Track agency projects through discovery, design, development, testing, launch and support",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: auto-detect from .studio/)
    #[arg(long, global = true, env = "STUDIO_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a studio data root
    Init {
        /// Agency name written to config.yaml
        #[arg(long)]
        name: Option<String>,
    },

    /// Serve the HTTP API
    Serve {
        /// Port to listen on (defaults to server.port in config.yaml)
        #[arg(long)]
        port: Option<u16>,

        /// HS256 secret used to verify bearer tokens
        #[arg(long, env = "STUDIO_JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,
    },

    /// Create, inspect and manage projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Manage a project's milestones
    Milestone {
        #[command(subcommand)]
        subcommand: MilestoneSubcommand,
    },

    /// Work a project's substep checklist
    Substep {
        #[command(subcommand)]
        subcommand: SubstepSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::Serve { port, jwt_secret } => cmd::serve::run(&root, port, jwt_secret),
        Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json),
        Commands::Milestone { subcommand } => cmd::milestone::run(&root, subcommand, cli.json),
        Commands::Substep { subcommand } => cmd::substep::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
