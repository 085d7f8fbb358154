pub mod error;
mod finalizer;
pub mod reap;
pub mod shutdown;
pub mod submit;
pub mod wait;

use std::sync::Arc;
use std::time::Duration;

use derive_debug::Dbg;
use tracing::{info, instrument};

use crate::config::polling::PollingConfig;
use crate::kubernetes_objects::cluster::JobClient;
use crate::kubernetes_objects::job_template::JobTemplate;

use self::error::RunError;
use self::shutdown::Shutdown;

/// Drives one job through submit, wait and cleanup. Holds no state between
/// runs besides the client handle.
#[derive(Dbg)]
pub struct JobRunner {
    #[dbg(skip)]
    client: Arc<dyn JobClient>,
    polling: PollingConfig,
}

impl JobRunner {
    pub fn new(client: Arc<dyn JobClient>, polling: PollingConfig) -> JobRunner {
        JobRunner { client, polling }
    }

    #[instrument("job_run", skip_all, fields(template = %template.base_name()))]
    pub async fn run(
        &self,
        template: &JobTemplate,
        container: &str,
        args: &[String],
        deadline: Option<Duration>,
        shutdown: &mut Shutdown,
    ) -> Result<(), RunError> {
        info!("Starting job run...");

        let job = self.submit(template, container, args).await?;
        let result = self
            .wait(&job, deadline, shutdown)
            .await
            .into_result(&job.name);

        self.finalizer(&job, result).await
    }
}
