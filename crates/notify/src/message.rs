use chrono::{DateTime, FixedOffset, Offset, Utc};
use incident::Transition;

const OPENED_PREFIX: &str = "\u{1f973} \u{1f4a1} \u{1f50c} \u{1f4e1}";
const RESOLVED_PREFIX: &str = "\u{1f635} \u{1f56f} \u{1fa94} \u{1f50b}";

/// Renders transitions as chat messages, with times shown at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct MessageFormatter {
    offset: FixedOffset,
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self { offset: Utc.fix() }
    }
}

impl MessageFormatter {
    /// Show times at `offset`.
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    fn local(&self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&self.offset).format("%Y-%m-%d %H:%M").to_string()
    }

    /// Message text for `transition`.
    pub fn render(&self, transition: &Transition) -> String {
        match transition {
            Transition::Opened(incident) => format!(
                "{} New incident \"{}\" started at {}",
                OPENED_PREFIX,
                incident.name,
                self.local(incident.started_at)
            ),
            Transition::Resolved(incident) => match incident.resolved_at {
                Some(at) => format!(
                    "{} Incident \"{}\" resolved at {}",
                    RESOLVED_PREFIX,
                    incident.name,
                    self.local(at)
                ),
                None => format!(
                    "{} Incident \"{}\" (started {}) is no longer reported by the provider",
                    RESOLVED_PREFIX,
                    incident.name,
                    self.local(incident.started_at)
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use incident::Incident;

    fn started() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 21, 30, 0).unwrap()
    }

    #[test]
    fn opened_message_uses_configured_offset() {
        let kyiv = FixedOffset::east_opt(2 * 3600).unwrap();
        let text = MessageFormatter::new(kyiv)
            .render(&Transition::Opened(Incident::open("1", "Home router", started())));
        assert_eq!(
            text,
            format!("{} New incident \"Home router\" started at 2025-03-01 23:30", OPENED_PREFIX)
        );
    }

    #[test]
    fn resolved_message_shows_resolution_time() {
        let resolved_at = Utc.with_ymd_and_hms(2025, 3, 1, 22, 5, 0).unwrap();
        let text = MessageFormatter::default().render(&Transition::Resolved(Incident::resolved(
            "1",
            "Home router",
            started(),
            resolved_at,
        )));
        assert_eq!(
            text,
            format!("{} Incident \"Home router\" resolved at 2025-03-01 22:05", RESOLVED_PREFIX)
        );
    }

    #[test]
    fn resolved_by_absence_message_says_so() {
        let text = MessageFormatter::default().render(&Transition::Resolved(
            Incident::resolved_by_absence("1", "Home router", started()),
        ));
        assert!(text.ends_with("is no longer reported by the provider"));
        assert!(text.contains("started 2025-03-01 21:30"));
    }
}
