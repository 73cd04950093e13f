//! [`Dashboard`] – high-visibility ANSI status line.
//!
//! Renders a single color-coded line from a telemetry snapshot: a green
//! "system safe" bar in STANDBY, or a yellow countdown bar with a bold red
//! caution message while an override is active. The line is written with a
//! leading carriage return so repeated calls repaint in place.
//!
//! [`Dashboard::render`] is pure (snapshot in, `String` out);
//! [`Dashboard::display`] is the thin stdout wrapper around it.

use std::io::Write;

use colored::Colorize;

use fguard_types::AccessTelemetry;

/// Default width of the presence bar, in cells.
pub const BAR_WIDTH: usize = 30;

/// Color status-line renderer over [`AccessTelemetry`] snapshots.
///
/// # Example
///
/// ```
/// use fguard_console::Dashboard;
/// use fguard_types::AccessTelemetry;
///
/// let dashboard = Dashboard::new();
/// let line = dashboard.render(&AccessTelemetry::standby(), 300.0);
/// assert!(line.contains("SYSTEM SAFE"));
/// ```
pub struct Dashboard {
    bar_width: usize,
}

impl Dashboard {
    /// Create a dashboard with the default [`BAR_WIDTH`].
    pub fn new() -> Self {
        Self {
            bar_width: BAR_WIDTH,
        }
    }

    /// Override the bar width (builder-style).
    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }

    /// The startup header for the access monitor.
    pub fn banner() -> String {
        "\n--- FACTORY CELL: ACCESS STATUS MONITOR ---".to_string()
    }

    /// Render one status line from `telemetry`.
    ///
    /// `timeout_secs` is the configured watchdog timeout; the countdown bar
    /// is scaled against it. The fill ratio is clamped to `[0, 1]`, so a
    /// stale or out-of-range snapshot still renders a sane bar.
    pub fn render(&self, telemetry: &AccessTelemetry, timeout_secs: f64) -> String {
        if !telemetry.active {
            let status = " [SYSTEM SAFE: STANDARD GUARDS ACTIVE] ";
            let bar = "░".repeat(self.bar_width).green();
            return format!("\r{status} [{bar}]");
        }

        let fraction = if timeout_secs > 0.0 {
            (telemetry.time_left_secs / timeout_secs).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = (self.bar_width as f64 * fraction) as usize;
        let bar = format!(
            "{}{}",
            "█".repeat(filled),
            "·".repeat(self.bar_width - filled)
        )
        .yellow();

        let tier = telemetry
            .clearance_name
            .as_deref()
            .unwrap_or("UNKNOWN")
            .to_uppercase();
        let remaining = telemetry.time_left_secs as u64;
        let caution = format!("CAUTION: {tier} OVERRIDE ACTIVE").red().bold();

        format!("\r [!] {caution} ({remaining}s) [!]  [{bar}]")
    }

    /// Render and write the line to stdout, flushing so partial repaints
    /// appear immediately.
    pub fn display(&self, telemetry: &AccessTelemetry, timeout_secs: f64) {
        let line = self.render(telemetry, timeout_secs);
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(line.as_bytes());
        let _ = stdout.flush();
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Dashboard {
        // Disable ANSI codes so assertions see the raw text.
        colored::control::set_override(false);
        Dashboard::new()
    }

    fn active_snapshot(time_left_secs: f64) -> AccessTelemetry {
        AccessTelemetry {
            active: true,
            clearance_name: Some("Maintenance".to_string()),
            badge_id: Some("MAINT-900".to_string()),
            time_left_secs,
        }
    }

    #[test]
    fn standby_renders_safe_bar() {
        let line = plain().render(&AccessTelemetry::standby(), 300.0);
        assert!(line.contains("SYSTEM SAFE: STANDARD GUARDS ACTIVE"));
        assert_eq!(line.matches('░').count(), BAR_WIDTH);
        assert!(!line.contains("CAUTION"));
    }

    #[test]
    fn active_renders_caution_with_tier_and_countdown() {
        let line = plain().render(&active_snapshot(150.0), 300.0);
        assert!(line.contains("CAUTION: MAINTENANCE OVERRIDE ACTIVE"));
        assert!(line.contains("(150s)"));
        // Half the window left → half the bar filled.
        assert_eq!(line.matches('█').count(), BAR_WIDTH / 2);
        assert_eq!(line.matches('·').count(), BAR_WIDTH - BAR_WIDTH / 2);
    }

    #[test]
    fn full_window_fills_the_bar() {
        let line = plain().render(&active_snapshot(300.0), 300.0);
        assert_eq!(line.matches('█').count(), BAR_WIDTH);
        assert_eq!(line.matches('·').count(), 0);
    }

    #[test]
    fn exhausted_window_empties_the_bar() {
        let line = plain().render(&active_snapshot(0.0), 300.0);
        assert_eq!(line.matches('█').count(), 0);
        assert_eq!(line.matches('·').count(), BAR_WIDTH);
        assert!(line.contains("(0s)"));
    }

    #[test]
    fn out_of_range_snapshot_is_clamped() {
        // time_left beyond the timeout must not overflow the bar.
        let line = plain().render(&active_snapshot(900.0), 300.0);
        assert_eq!(line.matches('█').count(), BAR_WIDTH);
    }

    #[test]
    fn custom_bar_width_is_respected() {
        colored::control::set_override(false);
        let dashboard = Dashboard::new().with_bar_width(10);
        let line = dashboard.render(&AccessTelemetry::standby(), 300.0);
        assert_eq!(line.matches('░').count(), 10);
    }

    #[test]
    fn missing_clearance_name_renders_placeholder() {
        let snapshot = AccessTelemetry {
            clearance_name: None,
            ..active_snapshot(10.0)
        };
        let line = plain().render(&snapshot, 300.0);
        assert!(line.contains("UNKNOWN OVERRIDE ACTIVE"));
    }

    #[test]
    fn banner_names_the_monitor() {
        assert!(Dashboard::banner().contains("ACCESS STATUS MONITOR"));
    }
}
