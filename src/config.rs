// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Env var naming the YAML config file.
pub const CONFIG_ENV: &str = "DDP_CONFIG";
/// Read from the working directory when `DDP_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "instaddp.yaml";

const LOCALES: [&str; 3] = ["en", "nl", "de"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Line-delimited first names for the name-likeness check.
    pub names_path: PathBuf,
    pub output_dir: PathBuf,
    pub session_id: String,
    pub donation_key: String,
    /// `en`, `nl` or `de`.
    pub locale: String,
    /// JSON object of precomputed per-image feature counts.
    pub annotations_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            names_path: PathBuf::from("assets/first_names.txt"),
            output_dir: PathBuf::from("output"),
            session_id: "local".to_string(),
            donation_key: "instagram".to_string(),
            locale: "en".to_string(),
            annotations_path: None,
            log_filter: "info,instaddp=debug".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let config: Config =
            serde_yaml::from_str(&text).with_context(|| format!("parsing config {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// `$DDP_CONFIG`, else `instaddp.yaml` if present, else defaults.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::load(path);
        }
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::load(DEFAULT_CONFIG_FILE);
        }
        info!("no config file; using defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if !LOCALES.contains(&self.locale.as_str()) {
            bail!("unsupported locale {:?}, expected one of {:?}", self.locale, LOCALES);
        }
        if self.session_id.is_empty() || self.donation_key.is_empty() {
            bail!("session_id and donation_key must not be empty");
        }
        Ok(())
    }
}
