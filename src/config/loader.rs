//! Discovers, reads and stacks the config layers.

use super::merge::merge_layers;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where a piece of configuration came from, bottom layer first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigLayer {
    /// Compiled-in defaults
    Builtin,
    /// `./taskboard/config.yaml`, or the explicit `--config` file
    Project,
    /// `~/.taskboard/config.yaml`
    Home,
    /// `TASKBOARD_*` variables
    Env,
}

impl ConfigLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLayer::Builtin => "built-in",
            ConfigLayer::Project => "project",
            ConfigLayer::Home => "home",
            ConfigLayer::Env => "env",
        }
    }
}

impl std::fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// `TASKBOARD_PROJECT_DIR` or `./taskboard`; `TASKBOARD_USER_DIR` or `~/.taskboard`.
    pub fn discover() -> Self {
        let project_dir = std::env::var("TASKBOARD_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("taskboard")));

        let user_dir = std::env::var("TASKBOARD_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".taskboard")));

        Self {
            project_dir,
            user_dir,
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn config_file(dir: Option<&Path>) -> Option<PathBuf> {
        dir.map(|d| d.join("config.yaml")).filter(|p| p.exists())
    }
}

/// Reads every config layer and stacks them into one [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Files that contributed, lowest layer first.
    sources: Vec<(ConfigLayer, PathBuf)>,
}

impl ConfigLoader {
    /// Load from discovered paths and the process environment.
    ///
    /// `explicit` (or `TASKBOARD_CONFIG_PATH`) replaces the project and user
    /// layers with a single file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("TASKBOARD_CONFIG_PATH").ok().map(PathBuf::from));
        Self::load_with(ConfigPaths::discover(), explicit, |key| {
            std::env::var(key).ok()
        })
    }

    /// Load with explicit paths and an environment lookup.
    pub fn load_with(
        paths: ConfigPaths,
        explicit: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut layers: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut sources = Vec::new();

        match explicit {
            Some(path) => {
                layers.push(read_yaml(&path)?);
                sources.push((ConfigLayer::Project, path));
            }
            None => {
                for (layer, dir) in [
                    (ConfigLayer::Project, paths.project_dir.as_deref()),
                    (ConfigLayer::Home, paths.user_dir.as_deref()),
                ] {
                    if let Some(file) = ConfigPaths::config_file(dir) {
                        match read_yaml(&file) {
                            Ok(value) => {
                                layers.push(value);
                                sources.push((layer, file));
                            }
                            Err(e) => warn!(layer = %layer, "Skipping unreadable config: {:#}", e),
                        }
                    }
                }
            }
        }

        let merged = merge_layers(layers);
        let mut config: Config =
            serde_json::from_value(merged).context("Invalid merged configuration")?;

        Self::apply_env_overrides(&mut config, env);

        for (layer, path) in &sources {
            debug!(layer = %layer, path = %path.display(), "Loaded config layer");
        }

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Environment layer. Unparseable values are ignored with a warning.
    fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
        if let Some(port) = env("TASKBOARD_PORT") {
            match port.parse() {
                Ok(port) => config.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid TASKBOARD_PORT"),
            }
        }

        if let Some(bind) = env("TASKBOARD_BIND") {
            match bind.parse() {
                Ok(bind) => config.server.bind = bind,
                Err(_) => warn!(value = %bind, "Ignoring invalid TASKBOARD_BIND"),
            }
        }

        if let Some(snapshot) = env("TASKBOARD_SNAPSHOT") {
            config.dashboard.snapshot = Some(PathBuf::from(snapshot));
        }

        if let Some(user) = env("TASKBOARD_CURRENT_USER") {
            match user.parse() {
                Ok(id) => config.dashboard.current_user = Some(id),
                Err(_) => warn!(value = %user, "Ignoring invalid TASKBOARD_CURRENT_USER"),
            }
        }

        if let Some(level) = env("TASKBOARD_LOG_LEVEL") {
            config.logging.level = level;
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest layer first.
    pub fn sources(&self) -> &[(ConfigLayer, PathBuf)] {
        &self.sources
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let value: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(value)
}
