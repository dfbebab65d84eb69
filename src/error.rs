use std::path::PathBuf;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum MistyError {
    /// Base URL is not absolute or its path lacks a trailing slash.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    /// Request target could not be resolved against the base URL.
    #[error("invalid request target {target:?}: {source}")]
    InvalidTarget {
        target: String,
        source: url::ParseError,
    },
    /// Request body could not be serialized to JSON.
    #[error("encode error: {0}")]
    Encoding(serde_json::Error),
    /// Rate or burst settings cannot describe a token bucket.
    #[error("invalid client options: {0}")]
    InvalidOptions(String),
    /// Transport request could not be assembled.
    #[error("build error: {0}")]
    Build(reqwest::Error),
    /// The call context was cancelled by the caller.
    #[error("call cancelled")]
    Cancelled,
    /// The call context deadline passed before the call completed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Config file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid YAML for [`crate::Config`].
    #[error("cannot parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
    /// No home directory to derive the default config path from.
    #[error("cannot find home directory")]
    NoHomeDir,
}

impl MistyError {
    /// Returns `true` for errors raised by the caller's context rather than
    /// by the request itself.
    pub fn is_context(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::MistyError;

    #[test]
    fn context_errors_are_distinguished() {
        assert!(MistyError::Cancelled.is_context());
        assert!(MistyError::DeadlineExceeded.is_context());
        assert!(!MistyError::InvalidBaseUrl("x".to_owned()).is_context());
        assert_eq!(MistyError::DeadlineExceeded.to_string(), "deadline exceeded");
    }
}
