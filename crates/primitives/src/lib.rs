//! Core primitives shared by the uptime-notify crates.
/// Retry helpers
pub mod retries;
