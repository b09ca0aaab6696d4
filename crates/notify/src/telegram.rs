//! Telegram Bot API channel.

use std::time::Duration;

use async_trait::async_trait;
use incident::{Transition, retry::is_retryable_http};
use primitives::retries::retry_with_backoff_if;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::{Notifier, error::NotifyError, message::MessageFormatter};

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// A timed out send may still have been delivered, so it is left to the next run
/// instead of being repeated here.
fn is_retryable(err: &NotifyError) -> bool {
    match err {
        NotifyError::Http(e) => !e.is_timeout() && is_retryable_http(e),
        NotifyError::Rejected { .. } => false,
    }
}

/// Sends transition messages to a Telegram chat through a bot.
///
/// An optional debug chat receives a copy of every delivered message and the
/// operator failure reports.
pub struct TelegramNotifier {
    http: HttpClient,
    api_url: Url,
    token: String,
    chat_id: String,
    debug_chat_id: Option<String>,
    formatter: MessageFormatter,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_url", &self.api_url.as_str())
            .field("chat_id", &self.chat_id)
            .field("debug_chat_id", &self.debug_chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// Create a notifier posting to `chat_id` through the Bot API at `api_url`.
    /// Every request is bounded by `timeout`.
    pub fn new(
        api_url: Url,
        token: String,
        chat_id: String,
        timeout: Duration,
        formatter: MessageFormatter,
    ) -> Result<Self, NotifyError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http, api_url, token, chat_id, debug_chat_id: None, formatter })
    }

    /// Also send to a debug chat.
    pub fn with_debug_chat(mut self, debug_chat_id: Option<String>) -> Self {
        self.debug_chat_id = debug_chat_id;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url.as_str().trim_end_matches('/'), self.token)
    }

    async fn post(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let resp = self
            .http
            .post(self.endpoint())
            .json(&SendMessage { chat_id, text })
            .send()
            .await?
            .error_for_status()?;

        let body: ApiResponse = resp.json().await?;
        if !body.ok {
            return Err(NotifyError::Rejected {
                description: body.description.unwrap_or_else(|| "no description".to_owned()),
            });
        }
        Ok(())
    }

    /// Send `text` to `chat_id`, retrying transient failures.
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        retry_with_backoff_if(|| self.post(chat_id, text), is_retryable).await
    }

    async fn send_debug(&self, text: &str) {
        let Some(debug_chat) = self.debug_chat_id.as_deref() else {
            return;
        };
        if let Err(e) = self.send_text(debug_chat, text).await {
            warn!(chat_id = debug_chat, error = %e, "Failed to send debug copy");
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, transition: &Transition) -> Result<(), NotifyError> {
        let text = self.formatter.render(transition);
        debug!(incident_id = %transition.id(), kind = transition.kind(), "Sending notification");

        self.send_text(&self.chat_id, &text).await?;
        info!(
            incident_id = %transition.id(),
            kind = transition.kind(),
            chat_id = %self.chat_id,
            "Notification delivered"
        );

        self.send_debug(&text).await;
        Ok(())
    }

    async fn report_failure(&self, summary: &str) {
        self.send_debug(&format!("\u{1f41e} ERROR\n{}", summary)).await;
    }
}
