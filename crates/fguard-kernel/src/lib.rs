//! `fguard-kernel` – Access Control & Presence Safety
//!
//! The enforcement core of FactoryGuard. It does not render or persist; it
//! verifies identity and regulates the single override session.
//!
//! # Modules
//!
//! - [`clearance_registry`] – [`ClearanceRegistry`][clearance_registry::ClearanceRegistry]:
//!   pure lookup logic over the badge directory and the accepted intent
//!   phrases, plus the tier-by-prefix clearance assignment.
//! - [`session_watchdog`] – [`SessionWatchdog`][session_watchdog::SessionWatchdog]:
//!   owns the single mutable session record; grants overrides via a
//!   two-factor handshake and revokes them automatically when operator
//!   presence is not reconfirmed within the configured timeout
//!   (dead-man's-switch).

pub mod clearance_registry;
pub mod session_watchdog;

pub use clearance_registry::ClearanceRegistry;
pub use session_watchdog::SessionWatchdog;
