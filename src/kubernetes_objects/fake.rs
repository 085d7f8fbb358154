use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::{Job, JobCondition, JobStatus};

use super::JOB_NAME_LABEL;
use super::cluster::{ClusterError, JobClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    CreateJob { namespace: String, name: String },
    GetJob { namespace: String, name: String },
    DeleteJob { namespace: String, name: String },
    DeletePods { namespace: String, label_selector: String },
}

#[derive(Default)]
struct FakeState {
    jobs: BTreeMap<(String, String), Job>,
    /// Selectors of pod sets that still exist, keyed by namespace.
    pods: BTreeSet<(String, String)>,
    statuses: VecDeque<JobStatus>,
    current_status: Option<JobStatus>,
    calls: Vec<Call>,
    fail_create: bool,
    fail_get: bool,
    fail_delete_pods: bool,
}

/// In-memory cluster. Each `get_job` observes the next scripted status; once
/// the script runs out the last status is repeated.
#[derive(Default)]
pub(crate) struct FakeJobClient {
    state: Mutex<FakeState>,
}

impl FakeJobClient {
    pub(crate) fn with_statuses(statuses: impl IntoIterator<Item = JobStatus>) -> Self {
        let client = Self::default();
        client.state.lock().unwrap().statuses = statuses.into_iter().collect();
        client
    }

    pub(crate) fn failing_create(self) -> Self {
        self.state.lock().unwrap().fail_create = true;
        self
    }

    pub(crate) fn failing_get(self) -> Self {
        self.state.lock().unwrap().fail_get = true;
        self
    }

    pub(crate) fn failing_delete_pods(self) -> Self {
        self.state.lock().unwrap().fail_delete_pods = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn job(&self, namespace: &str, name: &str) -> Option<Job> {
        self.state
            .lock()
            .unwrap()
            .jobs
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }
}

#[async_trait]
impl JobClient for FakeJobClient {
    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, ClusterError> {
        let mut state = self.state.lock().unwrap();
        let name = job.metadata.name.clone().unwrap_or_default();
        state.calls.push(Call::CreateJob {
            namespace: namespace.to_string(),
            name: name.clone(),
        });

        if state.fail_create {
            return Err(ClusterError::Transport("admission webhook denied the request".to_string()));
        }
        let key = (namespace.to_string(), name.clone());
        if state.jobs.contains_key(&key) {
            return Err(ClusterError::Transport(format!("jobs.batch \"{name}\" already exists")));
        }

        let mut created = job.clone();
        created.metadata.uid = Some(format!("uid-{name}"));
        state.jobs.insert(key, created.clone());
        state
            .pods
            .insert((namespace.to_string(), format!("{JOB_NAME_LABEL}={name}")));
        Ok(created)
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, ClusterError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetJob {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });

        if state.fail_get {
            return Err(ClusterError::Transport("connection reset by peer".to_string()));
        }
        if let Some(next) = state.statuses.pop_front() {
            state.current_status = Some(next);
        }
        let status = state.current_status.clone();
        let job = state
            .jobs
            .get_mut(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| ClusterError::NotFound {
                kind: "Job",
                name: name.to_string(),
            })?;
        job.status = status;
        Ok(job.clone())
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteJob {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });

        match state.jobs.remove(&(namespace.to_string(), name.to_string())) {
            Some(_) => Ok(()),
            None => Err(ClusterError::NotFound {
                kind: "Job",
                name: name.to_string(),
            }),
        }
    }

    async fn delete_pods(&self, namespace: &str, label_selector: &str) -> Result<(), ClusterError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeletePods {
            namespace: namespace.to_string(),
            label_selector: label_selector.to_string(),
        });

        if state.fail_delete_pods {
            return Err(ClusterError::Transport("etcdserver: request timed out".to_string()));
        }
        if state
            .pods
            .remove(&(namespace.to_string(), label_selector.to_string()))
        {
            Ok(())
        } else {
            Err(ClusterError::NotFound {
                kind: "Pods",
                name: label_selector.to_string(),
            })
        }
    }
}

pub(crate) fn running() -> JobStatus {
    JobStatus {
        active: Some(1),
        ..Default::default()
    }
}

pub(crate) fn succeeded() -> JobStatus {
    JobStatus {
        active: Some(0),
        succeeded: Some(1),
        conditions: Some(vec![condition("Complete", None)]),
        ..Default::default()
    }
}

pub(crate) fn failed(reason: &str) -> JobStatus {
    JobStatus {
        active: Some(0),
        failed: Some(1),
        conditions: Some(vec![condition("Failed", Some(reason))]),
        ..Default::default()
    }
}

pub(crate) fn condition(type_: &str, reason: Option<&str>) -> JobCondition {
    JobCondition {
        type_: type_.to_string(),
        status: "True".to_string(),
        reason: reason.map(str::to_string),
        ..Default::default()
    }
}
