use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use duration_string::DurationString;

use crate::config::{RawRunConfig, Settings};

#[derive(Debug, Parser)]
#[clap(
    version,
    about = "Run a Kubernetes Job from a template and clean it up afterwards"
)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub(crate) subcommand: SubCommands,
}

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum SubCommands {
    /// Submit the job, wait for it to finish and remove it
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct RunArgs {
    /// Job template, a local path or an https:// URL
    #[clap(short, long)]
    pub(crate) template_file: Option<String>,

    /// Container whose args are overridden
    #[clap(short, long)]
    pub(crate) container: Option<String>,

    /// Command line passed to the container, split with shell quoting rules
    #[clap(short, long, allow_hyphen_values = true)]
    pub(crate) args: Option<String>,

    /// Give up waiting after this long, e.g. `600` or `10m`. 0 waits forever
    #[clap(long, value_parser = parse_timeout)]
    pub(crate) timeout: Option<Duration>,

    /// Path to a kubeconfig file; the inferred config is used when omitted
    #[clap(long)]
    pub(crate) kubeconfig: Option<PathBuf>,

    /// YAML settings file
    #[clap(long)]
    pub(crate) settings: Option<PathBuf>,

    /// Token used to download remote templates
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub(crate) token: Option<String>,
}

impl RunArgs {
    pub(crate) fn into_raw(self, settings: Settings) -> RawRunConfig {
        RawRunConfig {
            template: self.template_file,
            container: self.container,
            args: self.args,
            timeout: self.timeout,
            kubeconfig: self.kubeconfig,
            token: self.token,
            settings,
        }
    }
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    if let Ok(secs) = value.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    value
        .parse::<DurationString>()
        .map(Duration::from)
        .map_err(|e| e.to_string())
}
