//! Visual audit – scripted diagnostic simulation with live rendering.
//!
//! Walks the full session lifecycle in front of the operator: standby,
//! admin badge-in, confirmed pulses, loss of presence, watchdog expiry,
//! reversion to safe mode. Intended as an acceptance check for a newly
//! wired cell, not as part of normal operation.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use colored::Colorize;

use fguard_console::Dashboard;
use fguard_kernel::SessionWatchdog;

use crate::lock;

/// Number of confirmed pulses rendered during the "operator present" phase.
const CONFIRMED_PULSES: usize = 5;

/// Maximum unconfirmed pulses rendered while waiting for expiry.
const COUNTDOWN_PULSES: usize = 10;

/// Run the audit against the shared watchdog.
///
/// Locks are taken per step so the background ticker keeps running; double
/// pulsing is harmless because expiry depends only on elapsed time.
pub fn run(watchdog: &Arc<Mutex<SessionWatchdog>>) {
    let dashboard = Dashboard::new();
    println!("{}", Dashboard::banner().bold());

    let timeout_secs = lock(watchdog).config().maintenance_timeout_secs;

    // 1. Initial state.
    {
        let mut wd = lock(watchdog);
        wd.maintenance_pulse(false);
        dashboard.display(&wd.telemetry(), timeout_secs);
    }
    thread::sleep(Duration::from_secs(1));

    // 2. Granting access.
    println!("\n\n{}", "[ACTION] Admin badging in …".bold());
    let granted = lock(watchdog)
        .request_override(Some("ARCH-001"), Some("admin override"))
        .unwrap_or(false);
    if !granted {
        println!("{}", "Audit aborted: admin handshake was denied.".red());
        return;
    }

    // 3. Confirmed pulses.
    for _ in 0..CONFIRMED_PULSES {
        {
            let mut wd = lock(watchdog);
            wd.maintenance_pulse(true);
            dashboard.display(&wd.telemetry(), timeout_secs);
        }
        thread::sleep(Duration::from_millis(500));
    }

    // 4. Operator disappears: fast-forward to near-expiry, then count down.
    println!("\n\n{}", "[ACTION] Operator leaves the area …".bold());
    lock(watchdog).rewind_presence(Duration::from_secs_f64((timeout_secs - 5.0).max(0.0)));

    for _ in 0..COUNTDOWN_PULSES {
        let report = {
            let mut wd = lock(watchdog);
            let report = wd.maintenance_pulse(false);
            dashboard.display(&wd.telemetry(), timeout_secs);
            report
        };
        thread::sleep(Duration::from_secs(1));
        if !report.still_active {
            break;
        }
    }

    println!(
        "\n\n{}",
        "--- AUDIT COMPLETE: CELL REVERTED TO SAFE ---".green().bold()
    );
}
