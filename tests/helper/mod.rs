//! Fetcher test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use update_resolver::config::UpdateConfig;
use update_resolver::error::RetrievalError;
use update_resolver::manifest::ManifestFetcher;
use update_resolver::update::{UpdateChecker, UpdateRegistry};

/// Fetcher serving fixed manifests by URL
#[derive(Default)]
pub struct StaticFetcher {
    manifests: HashMap<String, Vec<String>>,
    fetches: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, url: &str, lines: Vec<&str>) -> Self {
        self.manifests.insert(
            url.to_string(),
            lines.into_iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ManifestFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<String>, RetrievalError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.manifests.get(url) {
            Some(lines) => Ok(lines.clone()),
            None => Err(RetrievalError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Create a ready checker over a fresh registry
pub fn create_test_checker(fetcher: Arc<dyn ManifestFetcher>) -> UpdateChecker {
    let checker = UpdateChecker::new(
        Arc::new(UpdateRegistry::new()),
        fetcher,
        tokio::runtime::Handle::current(),
        UpdateConfig::default(),
    );
    checker.mark_ready();
    checker
}
