#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unrecognized options: {}", .0.join(", "))]
    UnknownOptions(Vec<String>),

    #[error("Invalid value for option `{key}`: {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("Failed to start profile `{name}`: {reason}")]
    ProfileStart { name: String, reason: String },

    #[error("The default profile cannot be closed; shut the runtime down instead")]
    CloseDefaultProfile,

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to stream response body to file: {0}")]
    Stream(#[source] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FetchError {
    /// Shorthand for a bad value under a recognized option key.
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
