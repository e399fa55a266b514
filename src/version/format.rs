//! Host-prefixed version strings
//!
//! Mods publish versions prefixed with the version of the host they run on, so
//! under the right-to-left ordering of [`codec`](super::codec) the mod's own
//! revision outranks the host prefix.

/// `{host}-{rev}`, e.g. `1.7.10-4`
pub fn revision(host: &str, rev: u32) -> String {
    format!("{host}-{rev}")
}

/// `{host}_{major}.{minor}.{rev}`, e.g. `1.7.10_2.1.0`
pub fn semantic(host: &str, major: u32, minor: u32, rev: u32) -> String {
    format!("{host}_{major}.{minor}.{rev}")
}

/// `{host}_{version}` for a free-form mod version
pub fn tagged(host: &str, version: &str) -> String {
    format!("{host}_{version}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::codec::compare_versions;
    use std::cmp::Ordering;

    #[test]
    fn builders_prefix_the_host_version() {
        assert_eq!(revision("1.7.10", 4), "1.7.10-4");
        assert_eq!(semantic("1.7.10", 2, 1, 0), "1.7.10_2.1.0");
        assert_eq!(tagged("1.7.10", "b3"), "1.7.10_b3");
    }

    #[test]
    fn newer_revision_on_same_host_compares_greater() {
        let old = revision("1.7.10", 3);
        let new = revision("1.7.10", 4);

        assert_eq!(
            compare_versions(Some(new.as_str()), Some(old.as_str())).unwrap(),
            Ordering::Greater
        );
    }
}
