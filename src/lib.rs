//! Remote update-manifest resolver
//!
//! Fetches plain-text manifests of `NAME:VERSION[=NOTES][@URL]` lines, merges
//! the announced updates into an [`UpdateRegistry`](update::UpdateRegistry)
//! and decides with [`compare_versions`](version::compare_versions) whether a
//! remote version is newer than the running one.

pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod update;
pub mod version;
