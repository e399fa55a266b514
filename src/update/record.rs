//! Update records and their derived status

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::version::codec::compare_versions;

/// One known update candidate for an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecord {
    /// Registry key, e.g. a mod name
    pub identifier: String,
    /// Version the caller reported when asking
    pub current_version: Option<String>,
    /// Version announced by the manifest; never empty
    pub remote_version: String,
    pub release_notes: Vec<String>,
    pub download_url: Option<String>,
}

/// Status of a record, derived from its versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateStatus {
    /// Remote version is newer; installing is meaningful
    Available,
    /// Remote version equals the running one
    Current,
    /// Remote version is older than the running one
    Stale,
    /// One of the versions could not be parsed
    Invalid,
}

impl UpdateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStatus::Available => "available",
            UpdateStatus::Current => "current",
            UpdateStatus::Stale => "stale",
            UpdateStatus::Invalid => "invalid",
        }
    }
}

impl UpdateRecord {
    pub fn new(identifier: impl Into<String>, remote_version: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            current_version: None,
            remote_version: remote_version.into(),
            release_notes: Vec::new(),
            download_url: None,
        }
    }

    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current_version = Some(version.into());
        self
    }

    pub fn with_notes<I, S>(mut self, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.release_notes = notes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn status(&self) -> UpdateStatus {
        let remote = Some(self.remote_version.as_str());
        match compare_versions(remote, self.current_version.as_deref()) {
            Ok(Ordering::Greater) => UpdateStatus::Available,
            Ok(Ordering::Equal) => UpdateStatus::Current,
            Ok(Ordering::Less) => UpdateStatus::Stale,
            Err(_) => UpdateStatus::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status() == UpdateStatus::Available
    }

    pub fn is_current(&self) -> bool {
        self.status() == UpdateStatus::Current
    }

    /// `"{current} -> {remote}"`, or just the remote version when the running
    /// version is unknown
    pub fn version_changes(&self) -> String {
        match &self.current_version {
            Some(current) => format!("{} -> {}", current, self.remote_version),
            None => self.remote_version.clone(),
        }
    }

    /// Fold a later record for the same identifier into this one
    ///
    /// Notes are appended in call order. Versions and the download URL only
    /// fill in values this record is missing.
    pub(crate) fn fold(&mut self, incoming: UpdateRecord) {
        if self.remote_version.is_empty() && !incoming.remote_version.is_empty() {
            self.remote_version = incoming.remote_version;
        }
        if self.current_version.is_none() {
            self.current_version = incoming.current_version;
        }
        if self.download_url.as_deref().is_none_or(str::is_empty) {
            if let Some(url) = incoming.download_url.filter(|url| !url.is_empty()) {
                self.download_url = Some(url);
            }
        }
        self.release_notes.extend(incoming.release_notes);
    }
}

/// A record stored in an [`UpdateRegistry`](super::registry::UpdateRegistry)
///
/// Cloning the entry clones the handle, not the record: every clone observes
/// later folds into the same record.
#[derive(Debug, Clone)]
pub struct UpdateEntry {
    inner: Arc<RwLock<UpdateRecord>>,
}

impl UpdateEntry {
    pub(crate) fn new(record: UpdateRecord) -> Self {
        Self {
            inner: Arc::new(RwLock::new(record)),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, UpdateRecord> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, UpdateRecord> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the record as it is right now
    pub fn snapshot(&self) -> UpdateRecord {
        self.read().clone()
    }

    pub fn identifier(&self) -> String {
        self.read().identifier.clone()
    }

    pub fn status(&self) -> UpdateStatus {
        self.read().status()
    }

    pub fn is_valid(&self) -> bool {
        self.read().is_valid()
    }

    /// Whether both handles point at the same stored record
    pub fn same_entry(&self, other: &UpdateEntry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2", Some("1.1"), UpdateStatus::Available)]
    #[case("1.2", None, UpdateStatus::Available)]
    #[case("1.2", Some("1.2"), UpdateStatus::Current)]
    #[case("1.2", Some("1.2.0"), UpdateStatus::Current)]
    #[case("1.1", Some("1.2"), UpdateStatus::Stale)]
    #[case("1.x y", Some("1.2"), UpdateStatus::Invalid)]
    fn status_is_derived_from_versions(
        #[case] remote: &str,
        #[case] current: Option<&str>,
        #[case] expected: UpdateStatus,
    ) {
        let mut record = UpdateRecord::new("Foo", remote);
        record.current_version = current.map(str::to_string);

        assert_eq!(record.status(), expected);
        assert_eq!(record.is_valid(), expected == UpdateStatus::Available);
    }

    #[test]
    fn version_changes_shows_both_versions() {
        let record = UpdateRecord::new("Foo", "1.2").with_current_version("1.1");
        assert_eq!(record.version_changes(), "1.1 -> 1.2");

        let record = UpdateRecord::new("Foo", "1.2");
        assert_eq!(record.version_changes(), "1.2");
    }

    #[test]
    fn fold_appends_notes_and_keeps_first_url() {
        let mut record = UpdateRecord::new("Foo", "1.2")
            .with_notes(["first"])
            .with_download_url("http://a");

        record.fold(
            UpdateRecord::new("Foo", "1.3")
                .with_notes(["second", "third"])
                .with_download_url("http://b"),
        );

        assert_eq!(record.remote_version, "1.2");
        assert_eq!(record.release_notes, vec!["first", "second", "third"]);
        assert_eq!(record.download_url.as_deref(), Some("http://a"));
    }

    #[test]
    fn fold_fills_missing_url_and_current_version() {
        let mut record = UpdateRecord::new("Foo", "1.2");

        record.fold(
            UpdateRecord::new("Foo", "1.2")
                .with_current_version("1.0")
                .with_download_url("http://b"),
        );

        assert_eq!(record.current_version.as_deref(), Some("1.0"));
        assert_eq!(record.download_url.as_deref(), Some("http://b"));
    }

    #[test]
    fn entry_clones_share_the_record() {
        let entry = UpdateEntry::new(UpdateRecord::new("Foo", "1.2"));
        let other = entry.clone();

        entry.write().release_notes.push("late note".to_string());

        assert!(entry.same_entry(&other));
        assert_eq!(other.snapshot().release_notes, vec!["late note"]);
    }
}
