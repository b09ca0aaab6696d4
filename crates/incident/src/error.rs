use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned while fetching incidents from the provider.
///
/// Any of these aborts a run before a single notification decision is made.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider could not be reached, timed out or answered with an
    /// unexpected status.
    #[error("incident provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The provider rejected the credentials.
    #[error("incident provider rejected credentials (HTTP {status})")]
    Auth {
        /// Status returned by the provider
        status: StatusCode,
    },
    /// The provider answered with a body that does not have the expected shape.
    #[error("malformed incident provider response: {0}")]
    Parse(#[from] serde_json::Error),
    /// The provider sent a pagination link that is not a valid URL.
    #[error("malformed pagination link {link:?}: {source}")]
    Pagination {
        /// The offending link
        link: String,
        /// Parse failure
        source: url::ParseError,
    },
    /// The provider still had more pages after the page limit. Acting on a partial
    /// window would resolve every observed incident on the missing pages.
    #[error("incident list truncated after {pages} pages")]
    Truncated {
        /// Pages fetched before giving up
        pages: usize,
    },
}

impl FetchError {
    /// Short machine-friendly label used in logs and operator reports.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) | Self::Truncated { .. } => "fetch",
            Self::Auth { .. } => "auth",
            Self::Parse(_) | Self::Pagination { .. } => "parse",
        }
    }
}

/// Errors building a [`NameFilter`](crate::NameFilter).
#[derive(Debug, Error)]
pub enum FilterError {
    /// The filter value was empty.
    #[error("incident name filter must not be empty")]
    Empty,
    /// The pattern is not a valid regular expression.
    #[error("invalid incident name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
