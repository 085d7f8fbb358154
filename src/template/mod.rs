use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, instrument};

const RAW_CONTENT_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to read template file '{0}': {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to request template from {0}: {1}")]
    Request(String, #[source] reqwest::Error),

    #[error("Could not read template file from {0}: server responded {1}")]
    Status(String, StatusCode),

    #[error("Failed to cache template at '{0}': {1}")]
    Cache(PathBuf, #[source] std::io::Error),
}

/// Where a job template is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Local(PathBuf),
    Remote(String),
}

impl TemplateSource {
    pub fn parse(location: &str) -> TemplateSource {
        if location.starts_with("https://") {
            TemplateSource::Remote(location.to_string())
        } else {
            TemplateSource::Local(PathBuf::from(location))
        }
    }

    /// Reads the template bytes. Remote templates are downloaded into
    /// `cache_dir` first and then read back from the cached copy.
    #[instrument("template/fetch", skip(self, token))]
    pub async fn fetch(&self, cache_dir: &Path, token: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let path = match self {
            TemplateSource::Local(path) => path.clone(),
            TemplateSource::Remote(url) => download(url, cache_dir, token).await?,
        };
        tokio::fs::read(&path)
            .await
            .map_err(|e| FetchError::Read(path, e))
    }
}

/// Cache location of a remote template, keyed by a hash of its URL.
pub(crate) fn cache_path(cache_dir: &Path, url: &str) -> PathBuf {
    let digest = Sha256::digest(url.as_bytes());
    cache_dir.join(format!("{}.yml", hex::encode(digest)))
}

async fn download(url: &str, cache_dir: &Path, token: Option<&str>) -> Result<PathBuf, FetchError> {
    let mut request = reqwest::Client::new().get(url);
    if let Some(token) = token {
        request = request
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, RAW_CONTENT_MEDIA_TYPE);
    }

    let response = request
        .send()
        .await
        .map_err(|e| FetchError::Request(url.to_string(), e))?;
    if response.status() != StatusCode::OK {
        return Err(FetchError::Status(url.to_string(), response.status()));
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::Request(url.to_string(), e))?;

    let downloaded = cache_path(cache_dir, url);
    tokio::fs::write(&downloaded, &body)
        .await
        .map_err(|e| FetchError::Cache(downloaded.clone(), e))?;
    info!("Template downloaded to '{}'.", downloaded.display());

    Ok(downloaded)
}
