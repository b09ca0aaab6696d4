//! Planning transitions from fetched incidents and committing delivered ones.
//!
//! Everything here is pure. The [`Driver`](crate::Driver) wires it to the
//! fetcher, the notifier and the state store.

use std::collections::BTreeMap;

use incident::{Incident, IncidentId, Transition};
use state::{ObservedIncident, ObservedSet};

/// Outcome of reconciling with every notification delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Transitions ordered by incident id
    pub transitions: Vec<Transition>,
    /// Set to save once all transitions are delivered
    pub next: ObservedSet,
}

/// Compute the transitions between `previous` and the `current` fetch.
///
/// - open and not in `previous`: [`Transition::Opened`]
/// - resolved and in `previous`: [`Transition::Resolved`]
/// - in `previous` but missing from `current` entirely: [`Transition::Resolved`],
///   since the provider will never report it again
///
/// When the fetch holds the same id more than once, an open record wins.
/// The result is sorted by incident id.
pub fn plan(current: &[Incident], previous: &ObservedSet) -> Vec<Transition> {
    let mut by_id: BTreeMap<&IncidentId, &Incident> = BTreeMap::new();
    for incident in current {
        by_id
            .entry(&incident.id)
            .and_modify(|seen| {
                if incident.is_open() {
                    *seen = incident;
                }
            })
            .or_insert(incident);
    }

    let mut transitions: Vec<Transition> = by_id
        .iter()
        .filter_map(|(id, incident)| match (incident.is_open(), previous.contains(id)) {
            (true, false) => Some(Transition::Opened((*incident).clone())),
            (false, true) => Some(Transition::Resolved((*incident).clone())),
            _ => None,
        })
        .collect();

    transitions.extend(
        previous
            .iter()
            .filter(|observed| !by_id.contains_key(&observed.id))
            .map(|observed| Transition::Resolved(observed.to_resolved_incident())),
    );

    transitions.sort_by(|a, b| a.id().cmp(b.id()));
    transitions
}

/// Apply the `delivered` transitions to `previous`.
///
/// Transitions left out keep their identifier's membership unchanged, so they
/// are planned again on the next run.
pub fn commit<'a, I>(previous: &ObservedSet, delivered: I) -> ObservedSet
where
    I: IntoIterator<Item = &'a Transition>,
{
    let mut next = previous.clone();
    for transition in delivered {
        match transition {
            Transition::Opened(incident) => next.insert(ObservedIncident::from_incident(incident)),
            Transition::Resolved(incident) => {
                next.remove(&incident.id);
            }
        }
    }
    next
}

/// [`plan`] followed by [`commit`] of every planned transition.
pub fn reconcile(current: &[Incident], previous: &ObservedSet) -> Reconciliation {
    let transitions = plan(current, previous);
    let next = commit(previous, &transitions);
    Reconciliation { transitions, next }
}
