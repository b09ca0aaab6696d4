use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-assigned incident identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentId(String);

impl IncidentId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IncidentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for IncidentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle state of an incident as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    /// The monitored target is still down.
    Open,
    /// The incident has been resolved.
    Resolved,
}

/// An incident reported by the monitoring provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incident {
    /// Incident identifier
    pub id: IncidentId,
    /// Incident name, matched against the configured filter
    pub name: String,
    /// Open or resolved
    pub status: IncidentStatus,
    /// When the incident started
    pub started_at: DateTime<Utc>,
    /// When the incident was resolved. `None` for open incidents, and for
    /// incidents that were resolved by disappearing from the provider feed.
    pub resolved_at: Option<DateTime<Utc>>,
    /// When the incident was acknowledged, if ever
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl Incident {
    /// Create an open, unacknowledged incident.
    pub fn open(id: impl Into<IncidentId>, name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: IncidentStatus::Open,
            started_at,
            resolved_at: None,
            acknowledged_at: None,
        }
    }

    /// Create an incident the provider reports as resolved at `resolved_at`.
    pub fn resolved(
        id: impl Into<IncidentId>,
        name: impl Into<String>,
        started_at: DateTime<Utc>,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            status: IncidentStatus::Resolved,
            resolved_at: Some(resolved_at),
            ..Self::open(id, name, started_at)
        }
    }

    /// Create a resolved incident without a resolution time, for an incident
    /// that is no longer reported by the provider at all.
    pub fn resolved_by_absence(
        id: impl Into<IncidentId>,
        name: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self { status: IncidentStatus::Resolved, ..Self::open(id, name, started_at) }
    }

    /// Set the acknowledgement time.
    pub fn with_acknowledged_at(mut self, at: DateTime<Utc>) -> Self {
        self.acknowledged_at = Some(at);
        self
    }

    /// Whether the incident is still open.
    pub const fn is_open(&self) -> bool {
        matches!(self.status, IncidentStatus::Open)
    }

    /// Whether the incident has been acknowledged.
    pub const fn is_acknowledged(&self) -> bool {
        self.acknowledged_at.is_some()
    }
}

/// A detected state change for one incident. Each one produces exactly one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// An incident was seen open for the first time.
    Opened(Incident),
    /// A previously reported incident is resolved, or no longer reported at all.
    Resolved(Incident),
}

impl Transition {
    /// The incident this transition is about.
    pub const fn incident(&self) -> &Incident {
        match self {
            Self::Opened(incident) | Self::Resolved(incident) => incident,
        }
    }

    /// Identifier of the incident.
    pub const fn id(&self) -> &IncidentId {
        &self.incident().id
    }

    /// `"opened"` or `"resolved"`, for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Opened(_) => "opened",
            Self::Resolved(_) => "resolved",
        }
    }
}
