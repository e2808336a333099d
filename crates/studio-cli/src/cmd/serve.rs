use anyhow::Context;
use studio_core::config::Config;
use studio_server::AuthConfig;
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>, jwt_secret: String) -> anyhow::Result<()> {
    if jwt_secret.trim().is_empty() {
        anyhow::bail!("--jwt-secret (or STUDIO_JWT_SECRET) must not be empty");
    }
    let config = Config::load(root).context("studio not initialized; run `studio init` first")?;
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;
        println!(
            "studio API for '{}' on http://localhost:{}",
            config.agency.name,
            listener.local_addr()?.port()
        );

        tokio::select! {
            result = studio_server::serve_on(root.to_path_buf(), listener, AuthConfig::new(jwt_secret)) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
