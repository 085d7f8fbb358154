use std::path::Path;
use std::sync::Arc;

use self::cli::{Cli, SubCommands};
use self::config::{ConfigError, ConfigLoadError, RunConfig, Settings};
use self::error::ParseError;
use self::kubernetes_objects::cluster::KubeJobClient;
use self::kubernetes_objects::job_template::JobTemplate;
use self::runner::JobRunner;
use self::runner::error::RunError;
use self::runner::shutdown::Shutdown;
use self::template::FetchError;
use clap::Parser;
use kube::Client;
use kube::config::{KubeConfigOptions, Kubeconfig, KubeconfigError};
use thiserror::Error;
use tracing::info;
use tracing_error::ExtractSpanTrace;
use tracing_error::SpanTrace;

pub(crate) mod cli;
pub mod config;
pub mod error;
pub mod kubernetes_objects;
pub mod runner;
pub mod template;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to load settings.\n{0}")]
    SettingsLoad(#[from] ConfigLoadError),

    #[error("Invalid configuration.\n{0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch job template.\n{0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to parse input.\n{0}")]
    Parse(#[from] ParseError),

    #[error("Failed to load kubeconfig.\n{0}")]
    Kubeconfig(#[from] KubeconfigError),

    #[error("Failed to initialize kubernetes client.\n{0}")]
    KubeClient(#[from] kube::Error),

    #[error("Job run stopped due to following error:\n{0}")]
    Run(#[from] RunError),
}

impl AppError {
    /// Process exit code. Timeouts and interruptions follow the `timeout(1)`
    /// and shell conventions so callers can tell them apart from job failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Run(RunError::TimedOut(_)) => 124,
            AppError::Run(RunError::Interrupted(_, _)) => 130,
            _ => 1,
        }
    }
}

impl ExtractSpanTrace for AppError {
    fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            AppError::Run(e) => e.span_trace(),
            _ => None,
        }
    }
}

async fn kube_client(kubeconfig: Option<&Path>) -> Result<Client, AppError> {
    match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)?;
            let config =
                kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await?;
            Ok(Client::try_from(config)?)
        }
        None => Ok(Client::try_default().await?),
    }
}

pub async fn app() -> Result<(), AppError> {
    let cli = Cli::parse();
    let SubCommands::Run(args) = cli.subcommand;

    let settings = match &args.settings {
        Some(path) => Settings::new_from_file(path).await?,
        None => Settings::default(),
    };
    let config = RunConfig::try_from(args.into_raw(settings))?;

    info!("Config Loaded.");

    let client = kube_client(config.kubeconfig.as_deref()).await?;

    info!("Kubernetes Client Initialized.");

    let bytes = config
        .template
        .fetch(&config.cache_dir, config.token.as_deref())
        .await?;
    let template = JobTemplate::from_yaml(&bytes)?;
    let command = shell_words::split(&config.command).map_err(ParseError::from)?;

    info!(
        "Template '{}' loaded for namespace '{}'.",
        template.base_name(),
        template.namespace()
    );

    let runner = JobRunner::new(
        Arc::new(KubeJobClient::new(client)),
        config.polling.clone(),
    );
    let mut shutdown = Shutdown::listen();
    runner
        .run(
            &template,
            &config.container,
            &command,
            config.timeout,
            &mut shutdown,
        )
        .await?;

    Ok(())
}
