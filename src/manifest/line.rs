//! Manifest line parser
//!
//! One manifest line announces one update:
//!
//! ```text
//! NAME:VERSION[=NOTE_LINE_1\nNOTE_LINE_2...][@URL]
//! ```
//!
//! The line is cut at the first `:`, the last `@` and the first `=` between
//! them. Lines without a `:` are not records and are skipped silently.

use tracing::trace;

use crate::update::record::UpdateRecord;

/// Separator between note lines as written inside a manifest line
pub const DEFAULT_NOTE_SEPARATOR: &str = "\\n";

/// The fields of one manifest line, borrowed from the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestLine<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub notes: Option<&'a str>,
    pub url: Option<&'a str>,
}

impl<'a> ManifestLine<'a> {
    /// Cut a line into its fields, or `None` when it has no `:`
    pub fn lex(line: &'a str) -> Option<Self> {
        let (name, rest) = line.trim().split_once(':')?;
        let (body, url) = match rest.rsplit_once('@') {
            Some((body, url)) => (body, Some(url)),
            None => (rest, None),
        };
        let (version, notes) = match body.split_once('=') {
            Some((version, notes)) => (version, Some(notes)),
            None => (body, None),
        };

        Some(Self {
            name,
            version,
            notes,
            url,
        })
    }
}

/// Turns manifest lines into [`UpdateRecord`]s for one expected identifier
#[derive(Debug, Clone)]
pub struct ManifestLineParser {
    note_separator: String,
}

impl Default for ManifestLineParser {
    fn default() -> Self {
        Self::new(DEFAULT_NOTE_SEPARATOR)
    }
}

impl ManifestLineParser {
    pub fn new(note_separator: &str) -> Self {
        Self {
            note_separator: note_separator.to_string(),
        }
    }

    /// Parse one line
    ///
    /// With no `expected_name` every line is accepted under its own name.
    /// Alias-matched lines are registered under the expected name. A line that
    /// announces exactly `current_version` is not news and yields `None`.
    pub fn parse(
        &self,
        line: &str,
        expected_name: Option<&str>,
        expected_alias: Option<&str>,
        current_version: Option<&str>,
    ) -> Option<UpdateRecord> {
        let fields = ManifestLine::lex(line)?;
        let identifier = expected_name.unwrap_or(fields.name);

        if fields.name != identifier && Some(fields.name) != expected_alias {
            return None;
        }

        if fields.version.is_empty() {
            trace!("Skipping manifest line without version: {:?}", line);
            return None;
        }

        if current_version == Some(fields.version) {
            return None;
        }

        Some(UpdateRecord {
            identifier: identifier.to_string(),
            current_version: current_version.map(str::to_string),
            remote_version: fields.version.to_string(),
            release_notes: self.split_notes(fields.notes),
            download_url: fields.url.filter(|url| !url.is_empty()).map(str::to_string),
        })
    }

    fn split_notes(&self, notes: Option<&str>) -> Vec<String> {
        match notes {
            Some(notes) if !notes.is_empty() => notes
                .split(self.note_separator.as_str())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Parse one line with the default note separator
pub fn parse_line(
    line: &str,
    expected_name: Option<&str>,
    expected_alias: Option<&str>,
    current_version: Option<&str>,
) -> Option<UpdateRecord> {
    ManifestLineParser::default().parse(line, expected_name, expected_alias, current_version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parse_line_reads_all_fields() {
        let record = parse_line(
            "Foo:1.2=Great update@http://x/y",
            Some("Foo"),
            None,
            Some("1.1"),
        )
        .unwrap();

        assert_eq!(
            record,
            UpdateRecord {
                identifier: "Foo".to_string(),
                current_version: Some("1.1".to_string()),
                remote_version: "1.2".to_string(),
                release_notes: vec!["Great update".to_string()],
                download_url: Some("http://x/y".to_string()),
            }
        );
    }

    #[test]
    fn parse_line_splits_notes_on_escaped_newline() {
        let record = parse_line(
            r"MyMod:1.2.0=Fixed crash on load\nAdded new feature@https://example.com/download",
            Some("MyMod"),
            None,
            None,
        )
        .unwrap();

        assert_eq!(
            record.release_notes,
            vec!["Fixed crash on load", "Added new feature"]
        );
        assert_eq!(
            record.download_url.as_deref(),
            Some("https://example.com/download")
        );
    }

    #[test]
    fn parse_line_accepts_minimal_line() {
        let record = parse_line("MyMod:1.2.0", Some("MyMod"), None, Some("1.1.0")).unwrap();

        assert_eq!(record.remote_version, "1.2.0");
        assert!(record.release_notes.is_empty());
        assert_eq!(record.download_url, None);
    }

    #[rstest]
    #[case::same_version("Foo:1.1", Some("Foo"), None, Some("1.1"))]
    #[case::name_mismatch("Bar:1.0", Some("Foo"), None, None)]
    #[case::no_colon("just a comment", Some("Foo"), None, None)]
    #[case::blank("", None, None, None)]
    #[case::empty_version("Foo:=notes", Some("Foo"), None, None)]
    fn parse_line_yields_nothing(
        #[case] line: &str,
        #[case] name: Option<&str>,
        #[case] alias: Option<&str>,
        #[case] current: Option<&str>,
    ) {
        assert_eq!(parse_line(line, name, alias, current), None);
    }

    #[test]
    fn parse_line_matches_alias_under_expected_name() {
        let record = parse_line("MF:2.0", Some("More Food"), Some("MF"), Some("1.0")).unwrap();

        assert_eq!(record.identifier, "More Food");
        assert_eq!(record.remote_version, "2.0");
    }

    #[test]
    fn parse_line_without_expected_name_adopts_line_name() {
        let record = parse_line("Anything:3", None, None, None).unwrap();

        assert_eq!(record.identifier, "Anything");
        assert_eq!(record.current_version, None);
    }

    #[test]
    fn parse_line_compares_current_version_as_plain_string() {
        // "1.1.0" and "1.1" are equal versions but different strings
        let record = parse_line("Foo:1.1.0", Some("Foo"), None, Some("1.1"));
        assert!(record.is_some());
    }

    #[test]
    fn parse_line_uses_last_at_for_url() {
        let record =
            parse_line("Foo:2=thanks @bob@http://x/y", Some("Foo"), None, None).unwrap();

        assert_eq!(record.release_notes, vec!["thanks @bob"]);
        assert_eq!(record.download_url.as_deref(), Some("http://x/y"));
    }

    #[test]
    fn parse_line_without_notes_stops_version_at_url() {
        let record = parse_line("Foo:2@http://x/y?a=b", Some("Foo"), None, None).unwrap();

        assert_eq!(record.remote_version, "2");
        assert!(record.release_notes.is_empty());
        assert_eq!(record.download_url.as_deref(), Some("http://x/y?a=b"));
    }

    #[test]
    fn parse_line_tolerates_equals_before_colon() {
        let record = parse_line("a=b:1", None, None, None).unwrap();

        assert_eq!(record.identifier, "a=b");
        assert_eq!(record.remote_version, "1");
    }

    #[test]
    fn parser_uses_configured_note_separator() {
        let parser = ManifestLineParser::new("|");
        let record = parser.parse("Foo:2=one|two", Some("Foo"), None, None).unwrap();

        assert_eq!(record.release_notes, vec!["one", "two"]);
    }

    #[test]
    fn lex_returns_borrowed_fields() {
        let fields = ManifestLine::lex("  Foo:1=n@u  ").unwrap();

        assert_eq!(
            fields,
            ManifestLine {
                name: "Foo",
                version: "1",
                notes: Some("n"),
                url: Some("u"),
            }
        );
    }
}
