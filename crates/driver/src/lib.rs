//! uptime-notify driver: reconciles fetched incidents against saved state and
//! drives one notification per transition.
#![allow(clippy::uninlined_format_args)]

/// Run pipeline
pub mod driver;
/// Run errors
pub mod error;
/// Transition planning and state commit
pub mod reconcile;

pub use driver::{Driver, FailedNotification, RunReport};
pub use error::RunError;
pub use reconcile::{Reconciliation, commit, plan, reconcile};
