//! Collaborator traits for presenting and applying updates
//!
//! This crate never renders text or installs anything; it decides which
//! records are worth announcing and hands them to these collaborators.

#[cfg(test)]
use mockall::automock;

use tracing::{error, info};

use crate::error::{CheckError, InstallError};
use crate::update::record::UpdateRecord;
use crate::update::registry::UpdateRegistry;

/// Renders update information to the user
#[cfg_attr(test, automock)]
pub trait UpdateNotifier: Send + Sync {
    /// Announces that the registry holds at least one update
    fn updates_found(&self, count: usize);

    /// Reports one valid update, including its release notes
    fn update_available(&self, record: &UpdateRecord);

    /// Reports that a valid update will not be installed automatically
    fn auto_update_disabled(&self, record: &UpdateRecord);

    /// Reports that no update is known for an identifier
    fn no_update(&self, identifier: &str);

    /// Reports a failed check; called once per failed check
    fn check_failed(&self, identifier: &str, error: &CheckError);
}

/// Applies an update, e.g. by downloading `download_url`
#[cfg_attr(test, automock)]
pub trait UpdateInstaller: Send + Sync {
    fn install(&self, record: &UpdateRecord) -> Result<(), InstallError>;
}

fn install_record(installer: &dyn UpdateInstaller, record: &UpdateRecord) -> bool {
    match installer.install(record) {
        Ok(()) => {
            info!(
                "Installed update {} for {}",
                record.remote_version, record.identifier
            );
            true
        }
        Err(e) => {
            error!("Failed to install update for {}: {}", record.identifier, e);
            false
        }
    }
}

/// Announce every valid update in the registry
///
/// Each valid record is reported, then installed when `auto_update` is set or
/// reported as not automatically installed otherwise. Returns the number of
/// records that were reported.
pub fn notify_all(
    registry: &UpdateRegistry,
    notifier: &dyn UpdateNotifier,
    installer: &dyn UpdateInstaller,
    auto_update: bool,
) -> usize {
    let valid: Vec<UpdateRecord> = registry
        .list_valid()
        .iter()
        .map(|entry| entry.snapshot())
        .collect();

    if valid.is_empty() {
        return 0;
    }

    notifier.updates_found(valid.len());
    for record in &valid {
        notifier.update_available(record);
        if auto_update {
            install_record(installer, record);
        } else {
            notifier.auto_update_disabled(record);
        }
    }

    valid.len()
}

/// Install the update registered for `identifier`
///
/// Returns false, after telling the notifier, when nothing is registered.
pub fn install(
    registry: &UpdateRegistry,
    notifier: &dyn UpdateNotifier,
    installer: &dyn UpdateInstaller,
    identifier: &str,
) -> bool {
    match registry.get(identifier) {
        Some(entry) => install_record(installer, &entry.snapshot()),
        None => {
            notifier.no_update(identifier);
            false
        }
    }
}

/// Install every registered update; returns how many installs succeeded
pub fn install_all(registry: &UpdateRegistry, installer: &dyn UpdateInstaller) -> usize {
    registry
        .list_all()
        .iter()
        .filter(|entry| install_record(installer, &entry.snapshot()))
        .count()
}
