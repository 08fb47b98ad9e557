use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{glog_debug, Error, Result};

/// Identity of the task a run executes when nothing else is configured.
pub const DEFAULT_TARGET: &str = "Write1";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub target: Option<String>,
    #[serde(default)]
    pub print_tasks: bool,
    #[serde(default)]
    pub strict_identities: bool,
}

impl Config {
    pub fn snapgraph_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".snapgraph"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::snapgraph_dir()?.join("snapgraph.toml"))
    }

    pub fn effective_target(&self) -> &str {
        self.target.as_deref().unwrap_or(DEFAULT_TARGET)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        glog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            glog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        glog_debug!(
            "Config loaded: target={:?}, print_tasks={}, strict_identities={}",
            config.target,
            config.print_tasks,
            config.strict_identities
        );
        Ok(config)
    }
}
