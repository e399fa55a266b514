//! Manifest layer
//! - line.rs: three-cut parser for `NAME:VERSION[=NOTES][@URL]` lines
//! - fetcher.rs: ManifestFetcher trait, HTTP fetcher and manifest sources
//! - alias.rs: default alias (acronym) for an identifier

pub mod alias;
pub mod fetcher;
pub mod line;

pub use alias::acronym;
pub use fetcher::{HttpManifestFetcher, ManifestFetcher, ManifestSource};
pub use line::{ManifestLine, ManifestLineParser, parse_line};
