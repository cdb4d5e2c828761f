//! Project Loader - Main Entry Point

use anyhow::{Context, Result};
use project_registry::{InMemoryStore, ProjectRegistry};
use tracing::info;

use project_loader::*;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // 2. Initialize logging
    logging::init(&config).context("Failed to initialize logging")?;
    logging::log_config(&config);

    // 3. Build the registry and restore persisted projects
    let registry = ProjectRegistry::new(config.root_search_path.clone());

    let store = InMemoryStore::with_projects(
        config
            .known_projects
            .iter()
            .map(|record| (record.project_id, record.project_name.clone())),
    );
    pipeline::restore(&config, &registry, &store)?;

    // 4. Run the load
    info!(project = %config.project_name, "Loading selection");
    let report = pipeline::run(&config, &registry, &store)
        .await
        .with_context(|| format!("Failed to load project {}", config.project_name))?;

    logging::print_summary(&report);
    println!("{}", serde_json::to_string_pretty(&registry.session())?);

    Ok(())
}
