use anyhow::Context;
use studio_core::{
    config::{Config, WarnLevel},
    io, paths,
};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let agency_name = name.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "agency".to_string())
    });

    println!("Initializing studio in: {}", root.display());

    for dir in [paths::STUDIO_DIR, paths::PROJECTS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::new(&agency_name)
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    let config = Config::load(root).context("failed to read config.yaml")?;
    for w in config.validate() {
        let label = match w.level {
            WarnLevel::Warning => "warning",
            WarnLevel::Error => "error",
        };
        println!("  {label}: {}", w.message);
    }

    println!("\nReady. Next: studio project create <name> --owner <user-id>");
    Ok(())
}
