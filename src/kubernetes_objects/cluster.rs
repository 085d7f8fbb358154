use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client};
use thiserror::Error;

use super::FIELD_MANAGER;

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("Kubernetes client error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Cluster request failed: {0}")]
    Transport(String),
}

impl ClusterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound { .. })
    }
}

fn classify(err: kube::Error, kind: &'static str, name: &str) -> ClusterError {
    match err {
        kube::Error::Api(ref response) if response.code == 404 => ClusterError::NotFound {
            kind,
            name: name.to_string(),
        },
        err => ClusterError::Kube(err),
    }
}

/// The cluster operations a job run needs. Every call is a single
/// request/response; implementations keep no client-side state.
#[async_trait]
pub trait JobClient: Send + Sync {
    /// Creates `job` and returns the object accepted by the API server.
    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, ClusterError>;

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, ClusterError>;

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), ClusterError>;

    /// Deletes every pod in `namespace` matching `label_selector` with the
    /// default grace period.
    async fn delete_pods(&self, namespace: &str, label_selector: &str) -> Result<(), ClusterError>;
}

#[derive(Clone)]
pub struct KubeJobClient {
    client: Client,
}

impl KubeJobClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobClient for KubeJobClient {
    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, ClusterError> {
        let jobs_api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        let post_params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        Ok(jobs_api.create(&post_params, job).await?)
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, ClusterError> {
        let jobs_api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        jobs_api
            .get(name)
            .await
            .map_err(|e| classify(e, "Job", name))
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), ClusterError> {
        let jobs_api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        jobs_api
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| classify(e, "Job", name))
    }

    async fn delete_pods(&self, namespace: &str, label_selector: &str) -> Result<(), ClusterError> {
        let pods_api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        pods_api
            .delete_collection(
                &DeleteParams::default(),
                &ListParams::default().labels(label_selector),
            )
            .await
            .map(|_| ())
            .map_err(|e| classify(e, "Pods", label_selector))
    }
}
