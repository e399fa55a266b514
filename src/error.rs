use thiserror::Error;

/// A version string could not be split into base-36 tokens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("Empty segment at position {position} in version {version:?}")]
    EmptySegment { version: String, position: usize },

    #[error("Invalid segment {segment:?} in version {version:?}")]
    InvalidSegment { version: String, segment: String },
}

/// Fetching a manifest failed
///
/// Carries rendered messages instead of the underlying `reqwest::Error` so the
/// outcome of a check can be shared between every holder of its handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Unexpected status {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("Failed to read manifest {path}: {message}")]
    Io { path: String, message: String },
}

impl RetrievalError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Outcome error of a background update check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("Update check for {0} was interrupted before completing")]
    Interrupted(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Reported by an [`UpdateInstaller`](crate::update::notify::UpdateInstaller)
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("No download URL for {0}")]
    MissingUrl(String),

    #[error("Install of {identifier} failed: {message}")]
    Failed { identifier: String, message: String },
}
