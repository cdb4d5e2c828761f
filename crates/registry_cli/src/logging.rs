use anyhow::Result;
use colored::Colorize;
use project_registry::LoaderStatus;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;
use crate::pipeline::LoadReport;

/// Initialize logging and tracing subsystem
pub fn init(config: &Config) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_json {
        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_thread_names(true)
            .with_target(true);

        Registry::default().with(env_filter).with(json_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer().with_target(false).compact();

        Registry::default().with(env_filter).with(fmt_layer).try_init()?;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Project loader starting");

    Ok(())
}

pub fn log_config(config: &Config) {
    tracing::info!(
        root = %config.root_search_path.display(),
        project = %config.project_name,
        kind = %config.selection_kind,
        selection = %config.selection_path().display(),
        known_projects = config.known_projects.len(),
        "Configuration loaded"
    );
}

pub fn print_summary(report: &LoadReport) {
    println!("{}", format_summary(report));
}

/// Colored run summary, framed by rules.
pub fn format_summary(report: &LoadReport) -> String {
    let status = match report.status {
        LoaderStatus::Loaded => "LOADED".bright_green().bold(),
        LoaderStatus::Empty => "EMPTY".bright_yellow().bold(),
        other => other.to_string().to_uppercase().bright_red().bold(),
    };
    let rule = "━".repeat(60).bright_black();

    format!(
        "\n{rule}\n  {} {} (id {})\n  {} {}  {}/{} items ({:.0}%)\n{rule}\n",
        "Project".bright_white(),
        report.project_name.bright_cyan(),
        report.project_id,
        "Status ".bright_white(),
        status,
        report.progress.current,
        report.progress.total,
        report.progress.percent()
    )
}
