use tracing::{info, instrument};

use super::JobRunner;
use super::error::RunError;
use super::submit::SubmittedJob;
use crate::error::SpannedExt;
use crate::kubernetes_objects::JOB_NAME_LABEL;
use crate::kubernetes_objects::cluster::ClusterError;

fn ignore_not_found(result: Result<(), ClusterError>) -> Result<(), ClusterError> {
    match result {
        Err(e) if e.is_not_found() => {
            info!("{}, nothing to remove.", e);
            Ok(())
        }
        other => other,
    }
}

impl JobRunner {
    /// Deletes the job's pods, then the job. Resources that are already gone
    /// count as removed.
    #[instrument(
        "job/cleanup",
        skip_all,
        fields(kubernetes_namespace = %job.namespace, job_name = %job.name)
    )]
    pub async fn cleanup(&self, job: &SubmittedJob) -> Result<(), RunError> {
        let label_selector = format!("{}={}", JOB_NAME_LABEL, job.name);
        info!("Removing pods matching '{}'...", label_selector);
        ignore_not_found(
            self.client
                .delete_pods(&job.namespace, &label_selector)
                .await,
        )
        .with_span_trace()
        .map_err(|e| RunError::Cleanup(job.name.clone(), e))?;

        info!("Removing the job '{}'...", job.name);
        ignore_not_found(self.client.delete_job(&job.namespace, &job.name).await)
            .with_span_trace()
            .map_err(|e| RunError::Cleanup(job.name.clone(), e))?;

        Ok(())
    }
}
