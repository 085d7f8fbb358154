pub mod polling;
mod raw;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use self::polling::PollingConfig;
use crate::template::TemplateSource;

pub(crate) use self::raw::RawRunConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Template file is required")]
    TemplateMissing,

    #[error("Container is required")]
    ContainerMissing,

    #[error("Secure random source is unavailable: {0}")]
    RandomSourceUnavailable(String),
}

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Failed to read settings file '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse settings file '{0}': {1}")]
    Yaml(PathBuf, #[source] serde_yaml::Error),
}

/// Optional file-backed settings shared by every run.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Settings {
    #[serde(default)]
    pub polling: PollingConfig,

    /// Directory remote templates are cached in. Defaults to the system temp dir.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Settings {
    pub async fn new_from_file(path: &Path) -> Result<Settings, ConfigLoadError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigLoadError::Io(path.to_path_buf(), e))?;
        serde_yaml::from_str(&content).map_err(|e| ConfigLoadError::Yaml(path.to_path_buf(), e))
    }
}

/// Validated parameters of a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub template: TemplateSource,
    pub container: String,

    /// Unparsed override command line, split with shell quoting rules later.
    pub command: String,

    /// `None` waits until the job reaches a terminal state.
    pub timeout: Option<Duration>,

    pub kubeconfig: Option<PathBuf>,
    pub token: Option<String>,
    pub polling: PollingConfig,
    pub cache_dir: PathBuf,
}
