use tracing::{error, info, instrument};
use tracing_error::ExtractSpanTrace;

use super::JobRunner;
use super::error::RunError;
use super::submit::SubmittedJob;

impl JobRunner {
    /// Always reaps the job. A cleanup failure is only returned when the run
    /// itself succeeded; otherwise it is logged and the run's error wins.
    #[instrument("finalizer", skip(self, job, result))]
    pub(super) async fn finalizer(
        &self,
        job: &SubmittedJob,
        result: Result<(), RunError>,
    ) -> Result<(), RunError> {
        info!("Cleaning up job '{}'...", job.name);
        match self.cleanup(job).await {
            Ok(()) => {
                info!("Job '{}' and its pods were removed.", job.name);
                result
            }
            Err(e) => {
                error!("Failed to clean up job '{}': {}", job.name, e);
                if let Some(span_trace) = e.span_trace() {
                    eprintln!("\n{}\n", color_spantrace::colorize(span_trace));
                }
                result.and(Err(e))
            }
        }
    }
}
