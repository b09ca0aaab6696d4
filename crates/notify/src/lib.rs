//! Notifications for incident transitions.
//!
//! [`Notifier`] is the seam the reconciliation pipeline sends through.
//! [`TelegramNotifier`] delivers to a Telegram chat and [`LogNotifier`] only
//! logs, for dry runs.
#![allow(clippy::uninlined_format_args)]

/// Notification errors
pub mod error;
/// Logging-only notifier
pub mod log;
/// Message rendering
pub mod message;
/// Telegram channel
pub mod telegram;

use async_trait::async_trait;
use incident::Transition;

pub use error::NotifyError;
pub use log::LogNotifier;
pub use message::MessageFormatter;
pub use telegram::TelegramNotifier;

/// Delivers one message per incident transition.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Name of the channel, for logs.
    fn name(&self) -> &'static str;

    /// Deliver a notification for `transition`. Anything but `Ok` counts as not delivered.
    async fn send(&self, transition: &Transition) -> Result<(), NotifyError>;

    /// Tell the operator a run failed. Best-effort; the default drops the report.
    async fn report_failure(&self, _summary: &str) {}
}
