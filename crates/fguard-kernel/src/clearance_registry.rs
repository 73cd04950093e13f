//! [`ClearanceRegistry`] – badge directory and intent lookup.
//!
//! Pure lookup logic, no mutable state. The registry answers three
//! questions for the session watchdog:
//!
//! 1. Is this badge known? (exact, case-sensitive directory match)
//! 2. Is this phrase an accepted override intent? (case-insensitive)
//! 3. Which clearance tier does this badge carry? (prefix rules, first
//!    match wins)

use std::collections::HashMap;

use fguard_types::ClearanceLevel;

/// Intent phrases accepted by default, stored lower-case.
const DEFAULT_INTENTS: [&str; 3] = ["start maintenance", "admin override", "system check"];

/// Badge-prefix → clearance rules, evaluated in priority order. "ARCH"
/// outranks "MAINT"; anything else falls through to Standard.
const PREFIX_RULES: [(&str, fn() -> ClearanceLevel); 2] = [
    ("ARCH", ClearanceLevel::admin),
    ("MAINT", ClearanceLevel::maintenance),
];

/// Static lookup table mapping badge identifiers to clearance tiers.
///
/// # Example
///
/// ```
/// use fguard_kernel::ClearanceRegistry;
/// use fguard_types::AccessConfig;
///
/// let registry = ClearanceRegistry::new(AccessConfig::default().auth_directory);
///
/// assert!(registry.is_known_badge("ARCH-001"));
/// assert!(registry.is_recognized_intent("  Admin Override "));
/// assert_eq!(registry.clearance_for_badge("ARCH-001").tier_rank, 3);
/// ```
pub struct ClearanceRegistry {
    auth_directory: HashMap<String, String>,
    intents: Vec<String>,
}

impl ClearanceRegistry {
    /// Build a registry over `auth_directory` with the default intent set.
    pub fn new(auth_directory: HashMap<String, String>) -> Self {
        Self::with_intents(
            auth_directory,
            DEFAULT_INTENTS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Build a registry with a substitute intent set. Phrases are matched
    /// case-insensitively, so they are normalized to lower-case here.
    pub fn with_intents(auth_directory: HashMap<String, String>, intents: Vec<String>) -> Self {
        Self {
            auth_directory,
            intents: intents.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Membership test against the directory keys. Case-sensitive exact
    /// match; no normalization beyond what the caller already applied.
    pub fn is_known_badge(&self, badge_id: &str) -> bool {
        self.auth_directory.contains_key(badge_id)
    }

    /// Role label recorded for `badge_id`, if the badge is known.
    pub fn role_label(&self, badge_id: &str) -> Option<&str> {
        self.auth_directory.get(badge_id).map(String::as_str)
    }

    /// Membership test against the accepted intent phrases, ignoring case
    /// and surrounding whitespace.
    pub fn is_recognized_intent(&self, text: &str) -> bool {
        let normalized = text.trim().to_lowercase();
        self.intents.iter().any(|i| *i == normalized)
    }

    /// Assign a clearance tier from the badge identifier's prefix.
    ///
    /// Rules are evaluated in fixed priority order ("ARCH" → Admin, then
    /// "MAINT" → Maintenance, else Standard) on the whitespace-trimmed
    /// identifier. The assignment is independent of the directory's role
    /// labels and total over all inputs.
    pub fn clearance_for_badge(&self, badge_id: &str) -> ClearanceLevel {
        let badge = badge_id.trim();
        for (prefix, clearance) in PREFIX_RULES {
            if badge.starts_with(prefix) {
                return clearance();
            }
        }
        ClearanceLevel::standard()
    }
}
