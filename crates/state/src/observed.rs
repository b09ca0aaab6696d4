use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use incident::{Incident, IncidentId};
use serde::{Deserialize, Serialize};

/// An incident that has been reported as open and not yet as resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedIncident {
    /// Incident identifier
    pub id: IncidentId,
    /// Name at the time it was reported, kept for the resolution message
    pub name: String,
    /// Start time at the time it was reported
    pub started_at: DateTime<Utc>,
}

impl ObservedIncident {
    /// Record an incident that was just reported as opened.
    pub fn from_incident(incident: &Incident) -> Self {
        Self { id: incident.id.clone(), name: incident.name.clone(), started_at: incident.started_at }
    }

    /// Rebuild a resolved incident for an entry the provider no longer reports.
    pub fn to_resolved_incident(&self) -> Incident {
        Incident::resolved_by_absence(self.id.clone(), self.name.clone(), self.started_at)
    }
}

/// Set of incident identifiers believed to be open, keyed and ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedSet {
    incidents: BTreeMap<IncidentId, ObservedIncident>,
}

impl ObservedSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` is in the set.
    pub fn contains(&self, id: &IncidentId) -> bool {
        self.incidents.contains_key(id)
    }

    /// Look up an entry.
    pub fn get(&self, id: &IncidentId) -> Option<&ObservedIncident> {
        self.incidents.get(id)
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, incident: ObservedIncident) {
        self.incidents.insert(incident.id.clone(), incident);
    }

    /// Remove an entry, returning it if it was present.
    pub fn remove(&mut self, id: &IncidentId) -> Option<ObservedIncident> {
        self.incidents.remove(id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &IncidentId> {
        self.incidents.keys()
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &ObservedIncident> {
        self.incidents.values()
    }
}

impl FromIterator<ObservedIncident> for ObservedSet {
    fn from_iter<T: IntoIterator<Item = ObservedIncident>>(iter: T) -> Self {
        let mut set = Self::new();
        for incident in iter {
            set.insert(incident);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ObservedSet {
    type Item = &'a ObservedIncident;
    type IntoIter = std::collections::btree_map::Values<'a, IncidentId, ObservedIncident>;

    fn into_iter(self) -> Self::IntoIter {
        self.incidents.values()
    }
}
