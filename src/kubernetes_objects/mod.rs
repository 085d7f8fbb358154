pub mod cluster;
#[cfg(test)]
pub(crate) mod fake;
pub mod job_name;
pub mod job_template;

pub(crate) const FIELD_MANAGER: &str = "kube-job";

/// Label the Job controller puts on every pod it creates.
pub(crate) const JOB_NAME_LABEL: &str = "job-name";

pub(crate) const DEFAULT_NAMESPACE: &str = "default";
