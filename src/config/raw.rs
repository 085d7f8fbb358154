use std::path::PathBuf;
use std::time::Duration;

use super::{ConfigError, RunConfig, Settings};
use crate::template::TemplateSource;

/// Run parameters as collected from the command line, before validation.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawRunConfig {
    pub(crate) template: Option<String>,
    pub(crate) container: Option<String>,
    pub(crate) args: Option<String>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) kubeconfig: Option<PathBuf>,
    pub(crate) token: Option<String>,
    pub(crate) settings: Settings,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<RawRunConfig> for RunConfig {
    type Error = ConfigError;

    fn try_from(raw: RawRunConfig) -> Result<Self, Self::Error> {
        let template = non_empty(raw.template).ok_or(ConfigError::TemplateMissing)?;
        let container = non_empty(raw.container).ok_or(ConfigError::ContainerMissing)?;

        Ok(RunConfig {
            template: TemplateSource::parse(&template),
            container,
            command: raw.args.unwrap_or_default(),
            timeout: raw.timeout.filter(|t| !t.is_zero()),
            kubeconfig: raw.kubeconfig,
            token: non_empty(raw.token),
            polling: raw.settings.polling,
            cache_dir: raw.settings.cache_dir.unwrap_or_else(std::env::temp_dir),
        })
    }
}
