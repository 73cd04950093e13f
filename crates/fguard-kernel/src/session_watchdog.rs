//! [`SessionWatchdog`] – override session state machine and presence
//! watchdog.
//!
//! The watchdog owns the single override session for the whole cell. An
//! operator badges in through [`SessionWatchdog::request_override`] (badge
//! plus spoken intent — both must pass), after which someone must keep
//! calling [`SessionWatchdog::maintenance_pulse`]. A pulse with presence
//! confirmed refreshes the presence clock; every pulse checks elapsed time
//! against the configured timeout and force-logs-out on expiry
//! (dead-man's-switch).
//!
//! Two states: **STANDBY** (no clearance held) and **OVERRIDE_ACTIVE**.
//! Expiry and [`SessionWatchdog::secure_logout`] both return to STANDBY,
//! which can always be re-entered from.
//!
//! All timestamps come from [`Instant`], which is monotonic and immune to
//! wall-clock adjustment.

use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use fguard_types::{
    AccessConfig, AccessError, AccessTelemetry, ClearanceLevel, DenialReason, PulseReport,
};

use crate::clearance_registry::ClearanceRegistry;

// ────────────────────────────────────────────────────────────────────────────
// Session record
// ────────────────────────────────────────────────────────────────────────────

/// The mutable session record. Holding `Some(ActiveSession)` *is* the
/// OVERRIDE_ACTIVE state; clearance, badge, and presence clock can never be
/// populated independently of each other.
struct ActiveSession {
    clearance: ClearanceLevel,
    badge_id: String,
    last_presence: Instant,
}

// ────────────────────────────────────────────────────────────────────────────
// SessionWatchdog
// ────────────────────────────────────────────────────────────────────────────

/// Manages identity verification and the maintenance-mode watchdog for the
/// single system-wide override session.
///
/// Construct one instance and pass it by reference to every collaborator;
/// tests may hold several independent instances.
///
/// # Example
///
/// ```
/// use fguard_kernel::SessionWatchdog;
/// use fguard_types::AccessConfig;
///
/// let mut watchdog = SessionWatchdog::new(AccessConfig::default());
///
/// let granted = watchdog
///     .request_override(Some("MAINT-900"), Some("start maintenance"))
///     .unwrap();
/// assert!(granted);
///
/// let report = watchdog.maintenance_pulse(true);
/// assert!(report.still_active);
/// ```
pub struct SessionWatchdog {
    config: AccessConfig,
    registry: ClearanceRegistry,
    session: Option<ActiveSession>,
}

impl SessionWatchdog {
    /// Create a watchdog in STANDBY, building its [`ClearanceRegistry`]
    /// from the configured badge directory.
    pub fn new(config: AccessConfig) -> Self {
        let registry = ClearanceRegistry::new(config.auth_directory.clone());
        Self::with_registry(config, registry)
    }

    /// Create a watchdog with an externally built registry (e.g. one using
    /// a substitute intent set).
    pub fn with_registry(config: AccessConfig, registry: ClearanceRegistry) -> Self {
        Self {
            config,
            registry,
            session: None,
        }
    }

    /// The configuration this watchdog was constructed with.
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// `true` while a clearance is held (OVERRIDE_ACTIVE).
    pub fn is_override_active(&self) -> bool {
        self.session.is_some()
    }

    /// Clearance of the active session, if any.
    pub fn active_clearance(&self) -> Option<&ClearanceLevel> {
        self.session.as_ref().map(|s| &s.clearance)
    }

    /// Badge ID of the active session, if any.
    pub fn active_badge(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.badge_id.as_str())
    }

    /// Two-factor override handshake.
    ///
    /// Both factors must independently pass before any state mutation:
    /// the trimmed badge must be in the directory (case-sensitive) and the
    /// trimmed, lower-cased intent must be a recognized phrase. A valid
    /// pair **unconditionally replaces** any active session — upgrade and
    /// downgrade both succeed.
    ///
    /// Returns `Ok(true)` on grant and `Ok(false)` on denial (unknown
    /// badge, unrecognized intent, empty strings). Denials never mutate
    /// state.
    ///
    /// # Errors
    ///
    /// [`AccessError::InvalidArgument`] when either argument is `None`.
    /// Absent inputs are an API misuse, not a denial.
    pub fn request_override(
        &mut self,
        badge_id: Option<&str>,
        intent: Option<&str>,
    ) -> Result<bool, AccessError> {
        self.request_override_at(badge_id, intent, Instant::now())
    }

    /// Process one watchdog pulse.
    ///
    /// In STANDBY this is a no-op reporting `still_active = true` ("no
    /// emergency" — not "session active"). When a session is active:
    ///
    /// 1. presence confirmed → refresh the presence clock;
    /// 2. measure elapsed time since last confirmed presence (after the
    ///    refresh, so a confirming pulse reads ~0);
    /// 3. `elapsed > timeout` (strictly) → forced logout and an EMERGENCY
    ///    report; otherwise an ACTIVE report with whole seconds remaining.
    ///
    /// Expiry is purely a function of elapsed time, never of how many
    /// pulses were delivered.
    pub fn maintenance_pulse(&mut self, operator_present: bool) -> PulseReport {
        self.pulse_at(operator_present, Instant::now())
    }

    /// Assemble a read-only telemetry snapshot for display consumers.
    ///
    /// Never mutates state; `time_left_secs` is computed fresh from the
    /// monotonic clock on every call and clamped to zero.
    pub fn telemetry(&self) -> AccessTelemetry {
        self.telemetry_at(Instant::now())
    }

    /// Terminate the active session and return to STANDBY.
    ///
    /// Idempotent: calling in STANDBY is a safe no-op. Used for explicit
    /// operator logout and internally by the expiry path.
    pub fn secure_logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(badge = %session.badge_id, "secure logout: session closed");
        }
    }

    /// Backdate the presence clock of the active session by `by`.
    ///
    /// Simulation hook: the visual audit uses it to approach expiry
    /// without waiting out the real timeout. No-op in STANDBY, and left
    /// unchanged if the monotonic clock cannot represent the earlier
    /// instant.
    pub fn rewind_presence(&mut self, by: Duration) {
        if let Some(session) = self.session.as_mut()
            && let Some(earlier) = session.last_presence.checked_sub(by)
        {
            session.last_presence = earlier;
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Clock-pinned internals (the public API passes `Instant::now()`)
    // ────────────────────────────────────────────────────────────────────

    fn request_override_at(
        &mut self,
        badge_id: Option<&str>,
        intent: Option<&str>,
        now: Instant,
    ) -> Result<bool, AccessError> {
        let badge_id = badge_id
            .ok_or_else(|| AccessError::InvalidArgument("badge_id must be present".to_string()))?;
        let intent = intent
            .ok_or_else(|| AccessError::InvalidArgument("intent must be present".to_string()))?;

        let clean_badge = badge_id.trim();
        let clean_intent = intent.trim().to_lowercase();

        if !self.registry.is_known_badge(clean_badge) {
            warn!(
                badge = clean_badge,
                reason = %DenialReason::InvalidBadge,
                "override denied"
            );
            return Ok(false);
        }

        if !self.registry.is_recognized_intent(&clean_intent) {
            warn!(
                intent = %clean_intent,
                reason = %DenialReason::IntentNotRecognized,
                "override denied"
            );
            return Ok(false);
        }

        let clearance = self.registry.clearance_for_badge(clean_badge);
        info!(
            badge = clean_badge,
            tier = clearance.tier_rank,
            clearance = %clearance.name,
            "override granted"
        );

        // A valid handshake always wins: any prior session is replaced
        // outright, regardless of relative tier.
        self.session = Some(ActiveSession {
            clearance,
            badge_id: clean_badge.to_string(),
            last_presence: now,
        });
        Ok(true)
    }

    fn pulse_at(&mut self, operator_present: bool, now: Instant) -> PulseReport {
        let Some(session) = self.session.as_mut() else {
            return PulseReport {
                still_active: true,
                message: "STANDBY: No active override.".to_string(),
            };
        };

        if operator_present {
            session.last_presence = now;
        }

        // Measured after any refresh above, so a confirming pulse always
        // reads elapsed ≈ 0.
        let elapsed = now
            .saturating_duration_since(session.last_presence)
            .as_secs_f64();

        if elapsed > self.config.maintenance_timeout_secs {
            error!(
                badge = %session.badge_id,
                elapsed_secs = elapsed,
                "watchdog expired: operator absent"
            );
            self.secure_logout();
            return PulseReport {
                still_active: false,
                message: "EMERGENCY: Watchdog timeout. Reverting to Safe Mode.".to_string(),
            };
        }

        let remaining = (self.config.maintenance_timeout_secs - elapsed).floor() as u64;
        PulseReport {
            still_active: true,
            message: format!("ACTIVE: Session confirmed. Timeout in {remaining}s"),
        }
    }

    fn telemetry_at(&self, now: Instant) -> AccessTelemetry {
        match &self.session {
            None => AccessTelemetry::standby(),
            Some(session) => {
                let elapsed = now
                    .saturating_duration_since(session.last_presence)
                    .as_secs_f64();
                AccessTelemetry {
                    active: true,
                    clearance_name: Some(session.clearance.name.clone()),
                    badge_id: Some(session.badge_id.clone()),
                    time_left_secs: (self.config.maintenance_timeout_secs - elapsed).max(0.0),
                }
            }
        }
    }
}
