//! Manifest retrieval

#[cfg(test)]
use mockall::automock;

use tracing::{debug, warn};

use crate::config::UpdateConfig;
use crate::error::RetrievalError;

/// Where a check reads its manifest from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// Fetched through a [`ManifestFetcher`]
    Url(String),
    /// Already split into lines; no fetch happens
    Lines(Vec<String>),
}

impl ManifestSource {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Lines(lines.into_iter().map(Into::into).collect())
    }

    /// Read a manifest file from disk into a [`ManifestSource::Lines`]
    pub fn from_file(path: &std::path::Path) -> Result<Self, RetrievalError> {
        let content = std::fs::read_to_string(path).map_err(|e| RetrievalError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::Lines(split_lines(&content)))
    }
}

/// Trait for retrieving manifest text
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// Fetches the manifest at `url`, one entry per line in source order
    async fn fetch(&self, url: &str) -> Result<Vec<String>, RetrievalError>;
}

/// Fetches manifests over HTTP(S)
pub struct HttpManifestFetcher {
    client: reqwest::Client,
}

impl HttpManifestFetcher {
    pub fn new(config: &UpdateConfig) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| RetrievalError::Network {
                url: String::new(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ManifestFetcher for HttpManifestFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<String>, RetrievalError> {
        debug!("Fetching manifest {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RetrievalError::from_reqwest(url, e))?;

        let status = response.status();

        if !status.is_success() {
            warn!("Manifest host returned status {}: {}", status, url);
            return Err(RetrievalError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                RetrievalError::from_reqwest(url, e)
            } else {
                warn!("Failed to read manifest body from {}: {}", url, e);
                RetrievalError::InvalidResponse {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let lines = split_lines(&body);
        debug!("Fetched {} manifest lines from {}", lines.len(), url);

        Ok(lines)
    }
}

fn split_lines(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}
