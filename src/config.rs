use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poll;

const CONFIG_FILE_NAME: &str = "conductr.toml";

#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    pub conduct_command: String,
    pub sandbox_command: String,
    pub bundle_dir: PathBuf,
    pub timeout_secs: u64,
    pub bundles: Vec<BundleConfig>,
}

#[derive(Deserialize, Clone)]
pub struct BundleConfig {
    pub name: String,
    pub bundle: PathBuf,
    pub configuration: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            conduct_command: String::from("conduct"),
            sandbox_command: String::from("sandbox"),
            bundle_dir: PathBuf::from("bundles"),
            timeout_secs: poll::DEFAULT_DEADLINE.as_secs(),
            bundles: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to find config file at {}", path.display()))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
        Ok(config)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
