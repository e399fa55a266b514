//! Update tracking layer
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Checker   │────▶│  Registry   │◀────│   Notify    │
//! │(fetch+parse)│     │(merge/fold) │     │(collaborate)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`checker`]: Background checks with in-flight deduplication
//! - [`registry`]: In-memory registry of update records
//! - [`record`]: `UpdateRecord`, its derived status and shared entries
//! - [`notify`]: Notifier and installer collaborator traits

pub mod checker;
pub mod notify;
pub mod record;
pub mod registry;

pub use checker::{CheckHandle, CheckRequest, CheckState, UpdateChecker};
pub use notify::{UpdateInstaller, UpdateNotifier};
pub use record::{UpdateEntry, UpdateRecord, UpdateStatus};
pub use registry::UpdateRegistry;
