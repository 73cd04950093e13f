use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tiered operator clearance: defines what a badged-in operator is allowed
/// to do while an override session is active.
///
/// `speed_limit_scale` and `stiffness_boost` are passthrough tuning data for
/// the motion stack; the watchdog itself never reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceLevel {
    pub name: String,
    /// 1 = lowest (Standard) … 3 = highest (Admin).
    pub tier_rank: u8,
    pub speed_limit_scale: f32,
    pub stiffness_boost: f32,
}

impl ClearanceLevel {
    fn new(name: &str, tier_rank: u8, speed_limit_scale: f32, stiffness_boost: f32) -> Self {
        Self {
            name: name.to_string(),
            tier_rank,
            speed_limit_scale,
            stiffness_boost,
        }
    }

    /// Tier 1 – default operator clearance.
    pub fn standard() -> Self {
        Self::new("Standard", 1, 0.5, 1.0)
    }

    /// Tier 2 – maintenance technician clearance.
    pub fn maintenance() -> Self {
        Self::new("Maintenance", 2, 0.8, 1.5)
    }

    /// Tier 3 – full administrative clearance.
    pub fn admin() -> Self {
        Self::new("Admin", 3, 1.0, 2.0)
    }
}

/// Immutable access-control configuration, injected into the session
/// watchdog at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Watchdog expiry: seconds of unconfirmed presence before a forced
    /// logout. Must be > 0.
    #[serde(default = "default_maintenance_timeout")]
    pub maintenance_timeout_secs: f64,

    /// Reserved: emergency signal-loss threshold. Carried through the
    /// configuration surface but not enforced by any current operation.
    #[serde(default = "default_heartbeat_threshold")]
    pub heartbeat_threshold_secs: f64,

    /// Badge ID → role label. Membership in this map is what makes a badge
    /// known; the role label is informational only.
    #[serde(default = "default_auth_directory")]
    pub auth_directory: HashMap<String, String>,
}

fn default_maintenance_timeout() -> f64 {
    300.0
}

fn default_heartbeat_threshold() -> f64 {
    1.0
}

fn default_auth_directory() -> HashMap<String, String> {
    HashMap::from([
        ("OP-7721".to_string(), "Standard Operator".to_string()),
        ("MAINT-900".to_string(), "Maintenance Tech".to_string()),
        ("ARCH-001".to_string(), "Senior Architect".to_string()),
    ])
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            maintenance_timeout_secs: default_maintenance_timeout(),
            heartbeat_threshold_secs: default_heartbeat_threshold(),
            auth_directory: default_auth_directory(),
        }
    }
}

/// Point-in-time session snapshot for display consumers.
///
/// Renderers receive this struct and nothing else; they must not reach back
/// into the watchdog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTelemetry {
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearance_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_id: Option<String>,
    /// Seconds until watchdog expiry; clamped to 0, never negative.
    pub time_left_secs: f64,
}

impl AccessTelemetry {
    /// Snapshot of an idle system: no clearance held, nothing counting down.
    pub fn standby() -> Self {
        Self {
            active: false,
            clearance_name: None,
            badge_id: None,
            time_left_secs: 0.0,
        }
    }
}

/// Outcome of a single watchdog pulse.
///
/// `still_active == false` means the pulse itself forced a logout. In
/// STANDBY the pulse is a no-op and reports `true` ("no emergency"), which
/// is *not* the same as "a session is active" — query the watchdog for
/// that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseReport {
    pub still_active: bool,
    pub message: String,
}

/// Why an override request was denied. Attached to the denial log line so
/// downstream log consumers get a stable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    InvalidBadge,
    IntentNotRecognized,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::InvalidBadge => write!(f, "invalid badge"),
            DenialReason::IntentNotRecognized => write!(f, "intent not recognized"),
        }
    }
}

/// Faults that propagate out of the access API.
///
/// Denials and watchdog expiries are ordinary return values, not errors;
/// the only fault a caller can receive is a misuse of the API boundary.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccessError {
    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clearance_tiers_are_fixed() {
        let standard = ClearanceLevel::standard();
        assert_eq!(standard.name, "Standard");
        assert_eq!(standard.tier_rank, 1);

        let maintenance = ClearanceLevel::maintenance();
        assert_eq!(maintenance.name, "Maintenance");
        assert_eq!(maintenance.tier_rank, 2);
        assert!((maintenance.speed_limit_scale - 0.8).abs() < f32::EPSILON);

        let admin = ClearanceLevel::admin();
        assert_eq!(admin.name, "Admin");
        assert_eq!(admin.tier_rank, 3);
        assert!((admin.stiffness_boost - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn clearance_serialization_roundtrip() {
        let level = ClearanceLevel::maintenance();
        let json = serde_json::to_string(&level).unwrap();
        let back: ClearanceLevel = serde_json::from_str(&json).unwrap();
        assert_eq!(level, back);
    }

    #[test]
    fn default_config_has_three_badges() {
        let cfg = AccessConfig::default();
        assert!((cfg.maintenance_timeout_secs - 300.0).abs() < f64::EPSILON);
        assert!((cfg.heartbeat_threshold_secs - 1.0).abs() < f64::EPSILON);
        assert_eq!(cfg.auth_directory.len(), 3);
        assert_eq!(
            cfg.auth_directory.get("OP-7721").map(String::as_str),
            Some("Standard Operator")
        );
        assert!(cfg.auth_directory.contains_key("MAINT-900"));
        assert!(cfg.auth_directory.contains_key("ARCH-001"));
    }

    #[test]
    fn standby_telemetry_is_inactive_with_zero_countdown() {
        let snapshot = AccessTelemetry::standby();
        assert!(!snapshot.active);
        assert!(snapshot.clearance_name.is_none());
        assert!(snapshot.badge_id.is_none());
        assert_eq!(snapshot.time_left_secs, 0.0);
    }

    #[test]
    fn telemetry_roundtrip_omits_absent_fields() {
        let snapshot = AccessTelemetry::standby();
        let json = serde_json::to_string(&snapshot).unwrap();
        // Absent clearance/badge must not appear as nulls on the wire.
        assert!(!json.contains("clearance_name"));
        assert!(!json.contains("badge_id"));

        let back: AccessTelemetry = serde_json::from_str(&json).unwrap();
        assert!(!back.active);
        assert!(back.badge_id.is_none());
    }

    #[test]
    fn denial_reason_labels() {
        assert_eq!(DenialReason::InvalidBadge.to_string(), "invalid badge");
        assert_eq!(
            DenialReason::IntentNotRecognized.to_string(),
            "intent not recognized"
        );
    }

    #[test]
    fn access_error_display() {
        let err = AccessError::InvalidArgument("badge_id must be present".to_string());
        assert!(err.to_string().contains("Invalid Argument"));
        assert!(err.to_string().contains("badge_id"));
    }
}
