use thiserror::Error;

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed. The request URL is stripped since it carries the bot token.
    #[error("messaging request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The messaging API answered but refused the message.
    #[error("messaging provider rejected the message: {description}")]
    Rejected {
        /// Reason given by the provider
        description: String,
    },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}
