//! Generator configuration.
//!
//! Values resolve in this order (highest priority wins):
//!
//! 1. Command-line flags (applied by the caller)
//! 2. Environment variables (`SCAFFOLD_*`)
//! 3. `smart-scaffold.toml` in the project directory
//! 4. Defaults

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::emit::RequirednessPolicy;

pub const CONFIG_FILE: &str = "smart-scaffold.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// Requiredness rule for the store/update form requests.
    pub requiredness: RequirednessPolicy,
    /// Strict stubs directory; embedded stubs are used when unset.
    pub stubs_dir: Option<PathBuf>,
    /// Default log filter for the CLI.
    pub log_level: String,
    /// Route-declaration file, relative to the project directory.
    pub routes_file: PathBuf,
    /// Also ensure the shared `Response` trait the controllers use.
    pub response_trait: bool,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            requiredness: RequirednessPolicy::Always,
            stubs_dir: None,
            log_level: "info".to_string(),
            routes_file: PathBuf::from("routes/api.php"),
            response_trait: true,
        }
    }
}

impl ScaffoldConfig {
    /// Defaults, then `smart-scaffold.toml` under `base` if present, then environment.
    pub fn load(base: &Path) -> Result<Self> {
        Self::load_from(base.join(CONFIG_FILE))
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env_vars()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_vars(&mut self) -> Result<()> {
        self.apply_vars(|key| env::var(key).ok())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(policy) = var("SCAFFOLD_REQUIREDNESS") {
            self.requiredness = RequirednessPolicy::from_str(&policy)
                .with_context(|| format!("SCAFFOLD_REQUIREDNESS: unknown policy `{}`", policy))?;
        }
        if let Some(dir) = var("SCAFFOLD_STUBS_DIR") {
            self.stubs_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = var("SCAFFOLD_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(file) = var("SCAFFOLD_ROUTES_FILE") {
            self.routes_file = PathBuf::from(file);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.routes_file.as_os_str().is_empty() {
            bail!("routes_file must not be empty");
        }
        if let Some(dir) = &self.stubs_dir {
            if !dir.is_dir() {
                bail!("stubs_dir {} is not a directory", dir.display());
            }
        }
        Ok(())
    }
}
