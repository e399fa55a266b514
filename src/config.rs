use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::manifest::line::DEFAULT_NOTE_SEPARATOR;

/// Timeout for manifest fetches in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

const APP_DIR_NAME: &str = "update-resolver";
const LOG_FILE_NAME: &str = "update-resolver.log";

/// User agent sent with manifest requests
pub const DEFAULT_USER_AGENT: &str = "update-resolver";

/// Update checking configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateConfig {
    /// When false, checks never hit the network
    pub enabled: bool,
    /// Install valid updates while notifying instead of only announcing them
    pub auto_update: bool,
    /// Manifest fetch timeout in milliseconds
    pub fetch_timeout: u64,
    pub user_agent: String,
    /// Separator between note lines inside a manifest line
    pub note_separator: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_update: false,
            fetch_timeout: FETCH_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            note_separator: DEFAULT_NOTE_SEPARATOR.to_string(),
        }
    }
}

impl UpdateConfig {
    /// Read a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout)
    }
}

/// Directory holding the resolver's log file
///
/// `$XDG_DATA_HOME/update-resolver`, else `~/.local/share/update-resolver`,
/// else `./update-resolver`.
pub fn data_dir() -> PathBuf {
    resolve_data_dir(std::env::var_os("XDG_DATA_HOME"), dirs::home_dir())
}

/// Default log file used when `--log-file` is not given
pub fn log_path() -> PathBuf {
    data_dir().join(LOG_FILE_NAME)
}

fn resolve_data_dir(xdg_data_home: Option<OsString>, home: Option<PathBuf>) -> PathBuf {
    let base = match (xdg_data_home, home) {
        (Some(xdg), _) if !xdg.is_empty() => PathBuf::from(xdg),
        (_, Some(home)) => home.join(".local").join("share"),
        _ => PathBuf::from("."),
    };
    base.join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn update_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<UpdateConfig>(json!({
            "autoUpdate": true
        }))
        .unwrap();

        assert!(result.auto_update);
        assert!(result.enabled);
        assert_eq!(result.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(result.note_separator, "\\n");
    }

    #[test]
    fn update_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<UpdateConfig>(json!({
            "enabled": false,
            "autoUpdate": true,
            "fetchTimeout": 500,
            "userAgent": "my-launcher",
            "noteSeparator": "|"
        }))
        .unwrap();

        assert_eq!(
            result,
            UpdateConfig {
                enabled: false,
                auto_update: true,
                fetch_timeout: 500,
                user_agent: "my-launcher".to_string(),
                note_separator: "|".to_string(),
            }
        );
    }

    #[test]
    fn load_reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fetchTimeout": 1000}}"#).unwrap();

        let config = UpdateConfig::load(file.path()).unwrap();

        assert_eq!(config.fetch_timeout, 1000);
    }

    #[test]
    fn load_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = UpdateConfig::load(file.path());

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn data_dir_prefers_xdg_data_home() {
        let path = resolve_data_dir(
            Some(OsString::from("/tmp/test-data")),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/update-resolver"));
    }

    #[test]
    fn data_dir_ignores_empty_xdg_data_home() {
        let path = resolve_data_dir(Some(OsString::new()), Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/update-resolver"));
    }

    #[test]
    fn data_dir_without_any_home_is_relative() {
        assert_eq!(resolve_data_dir(None, None), PathBuf::from("./update-resolver"));
    }

    #[test]
    fn log_path_lives_in_data_dir() {
        let path = log_path();

        assert_eq!(path.parent(), Some(data_dir().as_path()));
        assert_eq!(path.file_name().unwrap(), "update-resolver.log");
    }
}
