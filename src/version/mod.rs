//! Version ordering for update manifests
//!
//! # Modules
//!
//! - [`codec`]: Base-36 token parsing and the right-to-left comparison rule
//! - [`format`]: Builders for host-prefixed version strings

pub mod codec;
pub mod format;

pub use codec::{ManifestVersion, compare_version_sign, compare_versions};
