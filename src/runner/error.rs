use thiserror::Error;
use tracing_error::{ExtractSpanTrace, SpanTrace};

use super::wait::WaitError;
use crate::config::ConfigError;
use crate::error::SpannedErr;
use crate::kubernetes_objects::cluster::ClusterError;
use crate::kubernetes_objects::job_template::ContainerNotFound;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Environment precondition failed: {0}")]
    Precondition(#[from] ConfigError),

    #[error("{0}")]
    ContainerNotFound(#[from] ContainerNotFound),

    #[error("Failed to submit job '{0}': {1}")]
    Submission(String, SpannedErr<ClusterError>),

    #[error("Failed to check status of job '{0}': {1}")]
    Poll(String, SpannedErr<WaitError>),

    #[error("Job '{0}' failed: {1}")]
    JobFailed(String, String),

    #[error("Job '{0}' did not finish before the timeout")]
    TimedOut(String),

    #[error("Waiting for job '{0}' was interrupted by {1}")]
    Interrupted(String, &'static str),

    #[error("Failed to clean up job '{0}': {1}")]
    Cleanup(String, SpannedErr<ClusterError>),
}

impl ExtractSpanTrace for RunError {
    fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            RunError::Submission(_, e) => e.span_trace(),
            RunError::Poll(_, e) => e.span_trace(),
            RunError::Cleanup(_, e) => e.span_trace(),
            _ => None,
        }
    }
}
