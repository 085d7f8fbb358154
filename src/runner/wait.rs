use std::sync::Arc;
use std::time::Duration;

use futures::future;
use k8s_openapi::api::batch::v1::JobStatus;
use thiserror::Error;
use tokio::select;
use tokio::task::JoinError;
use tracing::{Instrument, error, info, instrument, warn};

use super::JobRunner;
use super::error::RunError;
use super::shutdown::Shutdown;
use super::submit::SubmittedJob;
use crate::error::SpannedErr;
use crate::kubernetes_objects::cluster::{ClusterError, JobClient};

const JOB_FAILED_CONDITION: &str = "Failed";

#[derive(Error, Debug)]
pub enum WaitError {
    #[error("Kubernetes client error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Poll task stopped unexpectedly: {0}")]
    TaskJoin(#[from] JoinError),
}

/// Terminal classification of a wait. Produced once per wait and never
/// revisited.
#[derive(Debug)]
pub enum JobOutcome {
    Succeeded,
    Failed(String),
    TimedOut,
    Interrupted(&'static str),
    Errored(SpannedErr<WaitError>),
}

impl JobOutcome {
    pub fn into_result(self, job_name: &str) -> Result<(), RunError> {
        match self {
            JobOutcome::Succeeded => Ok(()),
            JobOutcome::Failed(reason) => Err(RunError::JobFailed(job_name.to_string(), reason)),
            JobOutcome::TimedOut => Err(RunError::TimedOut(job_name.to_string())),
            JobOutcome::Interrupted(signal) => {
                Err(RunError::Interrupted(job_name.to_string(), signal))
            }
            JobOutcome::Errored(e) => Err(RunError::Poll(job_name.to_string(), e)),
        }
    }
}

/// The controller has not synced the job yet; the API server reports an
/// empty `status: {}` until it does.
fn is_unsynced(status: &JobStatus) -> bool {
    status.start_time.is_none()
        && status.conditions.as_ref().is_none_or(Vec::is_empty)
        && status.succeeded.unwrap_or(0) == 0
        && status.failed.unwrap_or(0) == 0
}

/// `None` while the job is still running. A status the controller has not
/// populated yet counts as running.
fn classify_status(status: Option<&JobStatus>) -> Option<JobOutcome> {
    let status = status?;
    if status.active.unwrap_or(0) != 0 || is_unsynced(status) {
        return None;
    }

    let failure = status
        .conditions
        .iter()
        .flatten()
        .find(|c| c.type_ == JOB_FAILED_CONDITION && c.status == "True");
    match failure {
        Some(condition) => Some(JobOutcome::Failed(
            condition
                .reason
                .clone()
                .or_else(|| condition.message.clone())
                .unwrap_or_else(|| "unknown".to_string()),
        )),
        None => Some(JobOutcome::Succeeded),
    }
}

async fn poll_until_finished(
    client: Arc<dyn JobClient>,
    namespace: String,
    job_name: String,
    poll_interval: Duration,
) -> JobOutcome {
    loop {
        tokio::time::sleep(poll_interval).await;

        let job = match client.get_job(&namespace, &job_name).await {
            Ok(job) => job,
            Err(e) => {
                error!("Error while checking job '{}': {}", job_name, e);
                return JobOutcome::Errored(SpannedErr::capture(WaitError::from(e)));
            }
        };

        if let Some(outcome) = classify_status(job.status.as_ref()) {
            return outcome;
        }
        info!(
            "Job '{}' still running (active: {:?}). Waiting another {} seconds...",
            job_name,
            job.status.and_then(|s| s.active),
            poll_interval.as_secs()
        );
    }
}

impl JobRunner {
    /// Polls the job until it finishes, `deadline` passes or `shutdown`
    /// fires, whichever comes first. A `None` or zero deadline waits
    /// indefinitely.
    ///
    /// When the deadline or shutdown wins, the poll task is detached rather
    /// than aborted: a request already sent to the API server may still
    /// complete.
    #[instrument(
        "job/wait",
        skip_all,
        fields(kubernetes_namespace = %job.namespace, job_name = %job.name)
    )]
    pub async fn wait(
        &self,
        job: &SubmittedJob,
        deadline: Option<Duration>,
        shutdown: &mut Shutdown,
    ) -> JobOutcome {
        let deadline = deadline.filter(|d| !d.is_zero());
        match deadline {
            Some(d) => info!(
                "Waiting up to {} seconds for job '{}' to finish...",
                d.as_secs(),
                job.name
            ),
            None => info!("Waiting for job '{}' to finish...", job.name),
        }

        let poll = tokio::spawn(
            poll_until_finished(
                self.client.clone(),
                job.namespace.clone(),
                job.name.clone(),
                self.polling.poll_interval,
            )
            .in_current_span(),
        );
        let expired = async move {
            match deadline {
                Some(d) => tokio::time::sleep(d).await,
                None => future::pending::<()>().await,
            }
        };

        let outcome = select! {
            joined = poll => match joined {
                Ok(outcome) => outcome,
                Err(e) => JobOutcome::Errored(SpannedErr::capture(WaitError::from(e))),
            },
            _ = expired => {
                warn!("Job '{}' did not finish within {} seconds.", job.name, deadline.unwrap_or_default().as_secs());
                JobOutcome::TimedOut
            }
            signal = shutdown.wait() => {
                warn!("Received {signal} while waiting for job '{}'.", job.name);
                JobOutcome::Interrupted(signal)
            }
        };

        match &outcome {
            JobOutcome::Succeeded => info!("Job '{}' succeeded.", job.name),
            JobOutcome::Failed(reason) => error!("Job '{}' failed: {}", job.name, reason),
            _ => {}
        }
        outcome
    }
}
