use k8s_openapi::api::batch::v1::Job;
use tracing::{info, instrument};

use super::JobRunner;
use super::error::RunError;
use crate::error::SpannedExt;
use crate::kubernetes_objects::job_name::generate_job_name;
use crate::kubernetes_objects::job_template::JobTemplate;

/// A job accepted by the API server, identified by namespace and name.
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub namespace: String,
    pub name: String,

    /// The object as returned on creation, including server-populated defaults.
    pub job: Job,
}

impl JobRunner {
    #[instrument(
        "job/submit",
        skip_all,
        fields(kubernetes_namespace = %template.namespace(), container = %container)
    )]
    pub async fn submit(
        &self,
        template: &JobTemplate,
        container: &str,
        args: &[String],
    ) -> Result<SubmittedJob, RunError> {
        let name = generate_job_name(template.base_name())?;

        info!("Received args:");
        for arg in args {
            info!("{}", arg);
        }

        let manifest = template.build(&name, container, args)?;
        let namespace = template.namespace().to_string();

        let created = self
            .client
            .create_job(&namespace, &manifest)
            .await
            .with_span_trace()
            .map_err(|e| RunError::Submission(name.clone(), e))?;

        info!("Job '{}' created in namespace '{}'.", name, namespace);
        Ok(SubmittedJob {
            namespace,
            name,
            job: created,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::polling::PollingConfig;
    use crate::kubernetes_objects::fake::{Call, FakeJobClient};

    const TEMPLATE: &str = r#"
apiVersion: batch/v1
kind: Job
metadata:
  name: demo
  namespace: ci
spec:
  template:
    spec:
      restartPolicy: Never
      containers:
        - name: runner
          image: alpine:3.20
          args: ["default"]
"#;

    fn template() -> JobTemplate {
        JobTemplate::from_yaml(TEMPLATE.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_submit_creates_job() {
        let client = Arc::new(FakeJobClient::default());
        let runner = JobRunner::new(client.clone(), PollingConfig::default());

        let args = vec!["echo".to_string(), "hi".to_string()];
        let job = runner.submit(&template(), "runner", &args).await.unwrap();

        assert_eq!(job.namespace, "ci");
        assert!(job.name.starts_with("demo-"));
        assert_eq!(job.name.len(), "demo-".len() + 32);
        assert_eq!(job.job.metadata.uid, Some(format!("uid-{}", job.name)));

        let stored = client.job("ci", &job.name).unwrap();
        let containers = stored.spec.unwrap().template.spec.unwrap().containers;
        assert_eq!(containers[0].args, Some(args));
        assert_eq!(
            client.calls(),
            vec![Call::CreateJob {
                namespace: "ci".to_string(),
                name: job.name.clone(),
            }]
        );
    }

    #[tokio::test]
    async fn test_submit_unknown_container_sends_nothing() {
        let client = Arc::new(FakeJobClient::default());
        let runner = JobRunner::new(client.clone(), PollingConfig::default());

        let result = runner.submit(&template(), "sidecar", &[]).await;

        assert!(matches!(
            result,
            Err(RunError::ContainerNotFound(ref e)) if e.requested == "sidecar" && e.available == vec!["runner"]
        ));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let client = Arc::new(FakeJobClient::default().failing_create());
        let runner = JobRunner::new(client, PollingConfig::default());

        let result = runner.submit(&template(), "runner", &[]).await;

        assert!(matches!(result, Err(RunError::Submission(name, _)) if name.starts_with("demo-")));
    }
}
