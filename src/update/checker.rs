//! Background update checks
//!
//! A check fetches a manifest, parses every line and merges the resulting
//! records into the shared [`UpdateRegistry`]. It runs as its own task on the
//! runtime handed to [`UpdateChecker::new`]; the caller gets a cloneable
//! [`CheckHandle`] to await or poll.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::UpdateConfig;
use crate::error::{CheckError, RetrievalError};
use crate::manifest::fetcher::{ManifestFetcher, ManifestSource};
use crate::manifest::line::ManifestLineParser;
use crate::update::notify::UpdateNotifier;
use crate::update::record::UpdateEntry;
use crate::update::registry::UpdateRegistry;

/// Lifecycle of a check for one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    /// No check has been issued
    Idle,
    Checking,
    Completed,
    Failed,
}

/// A request to check one identifier against a manifest
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub identifier: String,
    pub alias: Option<String>,
    pub current_version: Option<String>,
    pub source: ManifestSource,
}

impl CheckRequest {
    pub fn new(identifier: impl Into<String>, source: ManifestSource) -> Self {
        Self {
            identifier: identifier.into(),
            alias: None,
            current_version: None,
            source,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn current_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = Some(version.into());
        self
    }
}

type SharedOutcome<T> = Shared<BoxFuture<'static, Result<T, CheckError>>>;

/// Handle to a running or finished check
///
/// Dropping the handle abandons it; the check still runs to completion and
/// merges its records.
#[derive(Clone)]
pub struct CheckHandle<T: Clone> {
    state: watch::Receiver<CheckState>,
    outcome: SharedOutcome<T>,
}

impl<T> CheckHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn spawn<F>(runtime: &Handle, label: String, task: F) -> Self
    where
        F: FnOnce(watch::Sender<CheckState>) -> BoxFuture<'static, Result<T, CheckError>>,
    {
        let (state_tx, state_rx) = watch::channel(CheckState::Checking);
        let join = runtime.spawn(task(state_tx));
        let outcome = async move {
            join.await.unwrap_or_else(|e| {
                error!("Update check task for {} ended abnormally: {}", label, e);
                Err(CheckError::Interrupted(label))
            })
        }
        .boxed()
        .shared();

        Self {
            state: state_rx,
            outcome,
        }
    }

    fn ready(state: CheckState, outcome: Result<T, CheckError>) -> Self {
        let (_, state_rx) = watch::channel(state);
        Self {
            state: state_rx,
            outcome: futures::future::ready(outcome).boxed().shared(),
        }
    }

    /// Current state of the check
    ///
    /// A task that died without reporting counts as failed.
    pub fn state(&self) -> CheckState {
        let state = *self.state.borrow();
        if state == CheckState::Checking && self.state.has_changed().is_err() {
            CheckState::Failed
        } else {
            state
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.state() == CheckState::Checking
    }

    /// Wait for the check to finish
    pub async fn wait(&self) -> Result<T, CheckError> {
        self.outcome.clone().await
    }

    /// Result of the check if it has already finished
    pub fn try_result(&self) -> Option<Result<T, CheckError>> {
        self.outcome.peek().cloned()
    }
}

/// Runs update checks against a shared registry
pub struct UpdateChecker {
    registry: Arc<UpdateRegistry>,
    fetcher: Arc<dyn ManifestFetcher>,
    runtime: Handle,
    config: UpdateConfig,
    parser: ManifestLineParser,
    notifier: Option<Arc<dyn UpdateNotifier>>,
    ready: AtomicBool,
    checks: Mutex<HashMap<String, CheckHandle<Option<UpdateEntry>>>>,
}

impl UpdateChecker {
    pub fn new(
        registry: Arc<UpdateRegistry>,
        fetcher: Arc<dyn ManifestFetcher>,
        runtime: Handle,
        config: UpdateConfig,
    ) -> Self {
        let parser = ManifestLineParser::new(&config.note_separator);
        Self {
            registry,
            fetcher,
            runtime,
            config,
            parser,
            notifier: None,
            ready: AtomicBool::new(false),
            checks: Mutex::new(HashMap::new()),
        }
    }

    /// Report failed checks to `notifier`
    pub fn with_notifier(mut self, notifier: Arc<dyn UpdateNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn registry(&self) -> &Arc<UpdateRegistry> {
        &self.registry
    }

    /// Marks the point from which the host expects update checks
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn state(&self, identifier: &str) -> CheckState {
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .map_or(CheckState::Idle, CheckHandle::state)
    }

    /// Start a check for one identifier
    ///
    /// While a check for the same identifier is in flight its handle is
    /// returned instead of starting another one. The handle resolves to the
    /// registry entry for the identifier, if any.
    pub fn check(&self, request: CheckRequest) -> CheckHandle<Option<UpdateEntry>> {
        if !self.ready.load(Ordering::Acquire) {
            warn!(
                "{} is attempting an update check before the host is ready",
                request.identifier
            );
        }

        if !self.config.enabled {
            debug!(
                "Update checks are disabled; skipping fetch for {}",
                request.identifier
            );
            let entry = self
                .registry
                .get_for_version(&request.identifier, request.current_version.as_deref());
            return CheckHandle::ready(CheckState::Completed, Ok(entry));
        }

        let mut checks = self.checks.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = checks.get(&request.identifier) {
            if existing.is_in_flight() {
                debug!(
                    "Reusing in-flight update check for {}",
                    request.identifier
                );
                return existing.clone();
            }
        }

        let identifier = request.identifier.clone();
        let registry = self.registry.clone();
        let fetcher = self.fetcher.clone();
        let parser = self.parser.clone();
        let notifier = self.notifier.clone();

        let handle = CheckHandle::spawn(&self.runtime, identifier.clone(), move |state| {
            async move {
                let result = run_check(&registry, fetcher.as_ref(), &parser, &request).await;
                report(&state, notifier.as_deref(), &request.identifier, &result);
                result
            }
            .boxed()
        });

        checks.insert(identifier, handle.clone());
        handle
    }

    /// Merge every record of a manifest, whatever its name
    ///
    /// Resolves to the number of records merged.
    pub fn check_manifest(&self, source: ManifestSource) -> CheckHandle<usize> {
        if !self.config.enabled {
            debug!("Update checks are disabled; skipping manifest check");
            return CheckHandle::ready(CheckState::Completed, Ok(0));
        }

        let label = describe(&source);
        let registry = self.registry.clone();
        let fetcher = self.fetcher.clone();
        let parser = self.parser.clone();
        let notifier = self.notifier.clone();

        CheckHandle::spawn(&self.runtime, label.clone(), move |state| {
            async move {
                let result = read_source(fetcher.as_ref(), &source)
                    .await
                    .map(|lines| {
                        let records = lines
                            .iter()
                            .filter_map(|line| parser.parse(line, None, None, None));
                        let merged = registry.merge_all(records);
                        info!("Merged {} update records from {}", merged, label);
                        merged
                    })
                    .map_err(CheckError::from);
                report(&state, notifier.as_deref(), &label, &result);
                result
            }
            .boxed()
        })
    }
}

async fn read_source(
    fetcher: &dyn ManifestFetcher,
    source: &ManifestSource,
) -> Result<Vec<String>, RetrievalError> {
    match source {
        ManifestSource::Url(url) => fetcher.fetch(url).await,
        ManifestSource::Lines(lines) => Ok(lines.clone()),
    }
}

async fn run_check(
    registry: &UpdateRegistry,
    fetcher: &dyn ManifestFetcher,
    parser: &ManifestLineParser,
    request: &CheckRequest,
) -> Result<Option<UpdateEntry>, CheckError> {
    let lines = read_source(fetcher, &request.source).await?;

    let records: Vec<_> = lines
        .iter()
        .filter_map(|line| {
            parser.parse(
                line,
                Some(request.identifier.as_str()),
                request.alias.as_deref(),
                request.current_version.as_deref(),
            )
        })
        .collect();

    let merged = registry.merge_all(records);
    info!(
        "Update check for {} merged {} of {} manifest lines",
        request.identifier,
        merged,
        lines.len()
    );

    Ok(registry.get_for_version(
        &request.identifier,
        request.current_version.as_deref(),
    ))
}

fn report<T>(
    state: &watch::Sender<CheckState>,
    notifier: Option<&dyn UpdateNotifier>,
    label: &str,
    result: &Result<T, CheckError>,
) {
    match result {
        Ok(_) => {
            state.send_replace(CheckState::Completed);
        }
        Err(e) => {
            error!("Update check for {} failed: {}", label, e);
            state.send_replace(CheckState::Failed);
            if let Some(notifier) = notifier {
                notifier.check_failed(label, e);
            }
        }
    }
}

fn describe(source: &ManifestSource) -> String {
    match source {
        ManifestSource::Url(url) => url.clone(),
        ManifestSource::Lines(lines) => format!("{} inline lines", lines.len()),
    }
}
