use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::PodSpec;
use thiserror::Error;

use super::DEFAULT_NAMESPACE;
use crate::error::ParseError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Container '{requested}' does not exist in the template (available: {})",
    .available.join(", ")
)]
pub struct ContainerNotFound {
    pub requested: String,
    pub available: Vec<String>,
}

/// A Job manifest loaded from a template file. Never mutated; every
/// submission works on its own copy.
#[derive(Debug, Clone)]
pub struct JobTemplate {
    job: Job,
}

fn pod_spec(job: &Job) -> Option<&PodSpec> {
    job.spec.as_ref()?.template.spec.as_ref()
}

fn pod_spec_mut(job: &mut Job) -> Option<&mut PodSpec> {
    job.spec.as_mut()?.template.spec.as_mut()
}

impl JobTemplate {
    pub fn from_yaml(bytes: &[u8]) -> Result<JobTemplate, ParseError> {
        let job: Job = serde_yaml::from_slice(bytes)?;
        JobTemplate::try_from(job)
    }

    pub fn base_name(&self) -> &str {
        self.job.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.job
            .metadata
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn container_names(&self) -> Vec<String> {
        pod_spec(&self.job)
            .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Builds the manifest to submit: a copy of the template renamed to
    /// `name`, with the args of `container` replaced by `args`.
    pub fn build(
        &self,
        name: &str,
        container: &str,
        args: &[String],
    ) -> Result<Job, ContainerNotFound> {
        let mut job = self.job.clone();
        let namespace = self.namespace().to_string();

        let target = pod_spec_mut(&mut job)
            .and_then(|spec| spec.containers.iter_mut().find(|c| c.name == container))
            .ok_or_else(|| ContainerNotFound {
                requested: container.to_string(),
                available: self.container_names(),
            })?;
        target.args = Some(args.to_vec());

        job.metadata.name = Some(name.to_string());
        job.metadata.namespace = Some(namespace);
        Ok(job)
    }
}

impl TryFrom<Job> for JobTemplate {
    type Error = ParseError;

    fn try_from(job: Job) -> Result<Self, Self::Error> {
        if job.metadata.name.as_deref().is_none_or(str::is_empty) {
            return Err(ParseError::TemplateNameMissing);
        }
        if pod_spec(&job).is_none() {
            return Err(ParseError::TemplatePodSpecMissing);
        }
        Ok(JobTemplate { job })
    }
}
