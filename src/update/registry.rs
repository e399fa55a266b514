//! In-memory registry of update records

use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;
use tracing::debug;

use crate::manifest::line::ManifestLineParser;
use crate::update::record::{UpdateEntry, UpdateRecord};

/// Update records keyed by identifier
///
/// A merge holds the map's write lock and the record's write lock for the
/// whole fold, so readers never see a half-merged record. Entries are only
/// removed by [`clear`](Self::clear) or [`replace`](Self::replace).
#[derive(Debug, Default)]
pub struct UpdateRegistry {
    entries: RwLock<IndexMap<String, UpdateEntry>>,
}

impl UpdateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a record into the registry
    ///
    /// Folds into the existing entry for the identifier and returns that same
    /// entry, or inserts a new one. `None` is a no-op.
    pub fn merge(&self, record: Option<UpdateRecord>) -> Option<UpdateEntry> {
        let record = record?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Some(Self::merge_locked(&mut entries, record))
    }

    /// Merge a batch of records under a single lock acquisition
    ///
    /// Returns the number of records merged.
    pub fn merge_all<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = UpdateRecord>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        records
            .into_iter()
            .map(|record| Self::merge_locked(&mut entries, record))
            .count()
    }

    fn merge_locked(entries: &mut IndexMap<String, UpdateEntry>, record: UpdateRecord) -> UpdateEntry {
        match entries.get(&record.identifier) {
            Some(existing) => {
                debug!("Folding update for {} into existing entry", record.identifier);
                existing.write().fold(record);
                existing.clone()
            }
            None => {
                debug!(
                    "Registering update {} for {}",
                    record.remote_version, record.identifier
                );
                let entry = UpdateEntry::new(record);
                entries.insert(entry.identifier(), entry.clone());
                entry
            }
        }
    }

    pub fn get(&self, identifier: &str) -> Option<UpdateEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
    }

    /// Look up an entry and stamp it with the caller's running version
    pub fn get_for_version(
        &self,
        identifier: &str,
        current_version: Option<&str>,
    ) -> Option<UpdateEntry> {
        let entry = self.get(identifier)?;
        entry.write().current_version = current_version.map(str::to_string);
        Some(entry)
    }

    /// Every entry, in insertion order
    pub fn list_all(&self) -> Vec<UpdateEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Entries whose remote version is newer than the running one
    pub fn list_valid(&self) -> Vec<UpdateEntry> {
        self.list_all()
            .into_iter()
            .filter(UpdateEntry::is_valid)
            .collect()
    }

    /// Drop the entry for an identifier so the next check starts fresh
    pub fn clear(&self, identifier: &str) -> Option<UpdateEntry> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(identifier)
    }

    /// Store `record` as a new entry, returning the entry it displaced
    pub fn replace(&self, record: UpdateRecord) -> Option<UpdateEntry> {
        let entry = UpdateEntry::new(record);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.identifier(), entry)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve an identifier against already-fetched manifest lines
    ///
    /// A registered entry wins and only gets stamped with `current_version`;
    /// otherwise every matching line is parsed and merged first.
    pub fn resolve_lines<S: AsRef<str>>(
        &self,
        parser: &ManifestLineParser,
        identifier: &str,
        alias: Option<&str>,
        current_version: Option<&str>,
        lines: &[S],
    ) -> Option<UpdateEntry> {
        if let Some(entry) = self.get_for_version(identifier, current_version) {
            return Some(entry);
        }

        let records = lines.iter().filter_map(|line| {
            parser.parse(line.as_ref(), Some(identifier), alias, current_version)
        });
        self.merge_all(records);

        self.get(identifier)
    }
}
