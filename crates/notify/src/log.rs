use async_trait::async_trait;
use incident::Transition;
use tracing::warn;

use crate::{Notifier, error::NotifyError, message::MessageFormatter};

/// Logs what would have been sent instead of sending it. Used for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier {
    formatter: MessageFormatter,
}

impl LogNotifier {
    /// Create a logging notifier rendering messages with `formatter`.
    pub const fn new(formatter: MessageFormatter) -> Self {
        Self { formatter }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, transition: &Transition) -> Result<(), NotifyError> {
        warn!(
            incident_id = %transition.id(),
            kind = transition.kind(),
            text = %self.formatter.render(transition),
            "Dry run - would send notification"
        );
        Ok(())
    }

    async fn report_failure(&self, summary: &str) {
        warn!(summary, "Dry run - would report failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use incident::Incident;

    #[tokio::test]
    async fn always_succeeds() {
        let notifier = LogNotifier::default();
        let transition = Transition::Opened(Incident::open("1", "router", Utc::now()));
        assert!(notifier.send(&transition).await.is_ok());
        assert_eq!(notifier.name(), "log");
    }
}
