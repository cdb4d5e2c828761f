use anyhow::{Context, Result};
use clap::Parser;
use project_registry::{ProjectRecord, SelectionKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where pickers start; read-only once the registry is built
    pub root_search_path: PathBuf,

    /// Project to load into
    pub project_name: String,

    /// Whether the selection is a single file or a folder
    pub selection_kind: SelectionKind,

    /// Chosen file or folder, relative to the root unless absolute.
    /// Defaults to the root itself.
    pub selection: Option<PathBuf>,

    /// Projects persisted by earlier runs
    pub known_projects: Vec<ProjectRecord>,

    /// File extensions accepted as labeling items
    pub allowed_extensions: Vec<String>,

    /// Log level
    pub log_level: String,

    /// Emit JSON logs instead of human-readable ones
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_search_path: default_root(),
            project_name: "default".to_string(),
            selection_kind: SelectionKind::Folder,
            selection: None,
            known_projects: Vec::new(),
            allowed_extensions: ["jpg", "jpeg", "png", "bmp", "tif", "tiff"]
                .into_iter()
                .map(String::from)
                .collect(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

fn default_root() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "project-loader")]
#[command(about = "Register a labeling project and load a file or folder into it")]
pub struct Cli {
    /// Configuration file path (JSON or TOML)
    #[arg(short, long, env = "LOADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root search path
    #[arg(long, env = "LOADER_ROOT")]
    pub root: Option<PathBuf>,

    /// Project name
    #[arg(short, long, env = "LOADER_PROJECT")]
    pub project: Option<String>,

    /// Selection kind: file or folder
    #[arg(short, long, env = "LOADER_KIND")]
    pub kind: Option<String>,

    /// Selected file or folder
    #[arg(short, long, env = "LOADER_SELECT")]
    pub select: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "LOADER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// JSON log output
    #[arg(long, env = "LOADER_LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    /// Load configuration from defaults, optional config file, then CLI args
    pub fn from_env() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(root) = cli.root {
            config.root_search_path = root;
        }
        if let Some(project) = cli.project {
            config.project_name = project;
        }
        if let Some(kind) = cli.kind {
            config.selection_kind = kind.parse()?;
        }
        if let Some(select) = cli.select {
            config.selection = Some(select);
        }
        if let Some(log_level) = cli.log_level {
            config.log_level = log_level;
        }
        if cli.log_json {
            config.log_json = true;
        }

        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let config = if is_toml {
            toml::from_str(&contents).context("Failed to parse TOML config")?
        } else {
            serde_json::from_str(&contents).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    /// The picked path, resolved against the root search path.
    pub fn selection_path(&self) -> PathBuf {
        match &self.selection {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.root_search_path.join(path),
            None => self.root_search_path.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            anyhow::bail!("project_name must not be empty");
        }

        if self.allowed_extensions.is_empty() {
            anyhow::bail!("allowed_extensions must list at least one extension");
        }

        if self.selection_kind == SelectionKind::File && self.selection.is_none() {
            tracing::warn!("File selection without --select falls back to the root path");
        }

        Ok(())
    }
}
