//! Incident crate: Better Uptime integration, incident model and name filtering.
#![allow(clippy::uninlined_format_args)]
/// Better Uptime client
pub mod client;
/// Fetch and filter errors
pub mod error;
/// Incident name filter
pub mod filter;
/// Incident data model
pub mod model;
/// Retry helpers for HTTP operations
pub mod retry;

use async_trait::async_trait;

pub use client::Client;
pub use error::{FetchError, FilterError};
pub use filter::NameFilter;
pub use model::{Incident, IncidentId, IncidentStatus, Transition};

/// A provider of incident state.
///
/// The reconciliation pipeline depends only on this capability, never on the
/// provider's wire format.
#[async_trait]
pub trait IncidentSource: Send + Sync {
    /// Returns the current incidents whose name matches `filter`.
    async fn fetch_incidents(&self, filter: &NameFilter) -> Result<Vec<Incident>, FetchError>;

    /// Acknowledges an open incident on the provider side.
    async fn acknowledge(&self, id: &IncidentId) -> Result<(), FetchError>;
}
