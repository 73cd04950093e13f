//! `fguard-console` – status rendering for the cell's access monitor.
//!
//! Strictly a consumer of
//! [`AccessTelemetry`](fguard_types::AccessTelemetry) snapshots: rendering
//! never mutates watchdog state and may be invoked at arbitrary frequency.

pub mod dashboard;

pub use dashboard::Dashboard;
