//! REPL – Read-Eval-Print Loop for the FactoryGuard interactive shell.
//!
//! Supported slash-commands:
//!   /help                       – show this list
//!   /override <badge> <intent…> – request an override session
//!   /confirm                    – confirm operator presence (refresh pulse)
//!   /status                     – render the dashboard status line
//!   /logout                     – terminate the active session
//!   /audit                      – run the scripted visual audit
//!   /quit | /exit               – gracefully exit the CLI

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use colored::Colorize;

use fguard_console::Dashboard;
use fguard_kernel::SessionWatchdog;

use crate::{audit, lock};

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set (e.g. by the Ctrl-C
/// handler) the REPL exits cleanly.
pub fn run(shutdown: Arc<AtomicBool>, watchdog: Arc<Mutex<SessionWatchdog>>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let dashboard = Dashboard::new();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "fguard>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }

        // Dispatch on the first token so arguments don't confuse matching.
        let head = cmd.split_whitespace().next().unwrap_or(cmd);
        match head {
            "/help" => cmd_help(),
            "/confirm" => cmd_confirm(&watchdog),
            "/status" => cmd_status(&watchdog, &dashboard),
            "/logout" => cmd_logout(&watchdog),
            "/audit" => audit::run(&watchdog),
            "/quit" | "/exit" => {
                lock(&watchdog).secure_logout();
                println!("{}", "Session closed. Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            "/override" => cmd_override(&watchdog, cmd),
            other => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "FactoryGuard Commands".bold().underline());
    println!(
        "  {} – request an override session",
        "/override <badge> <intent…>".bold().cyan()
    );
    println!(
        "  {}                    – confirm operator presence",
        "/confirm".bold().cyan()
    );
    println!(
        "  {}                     – render the status line",
        "/status".bold().cyan()
    );
    println!(
        "  {}                     – terminate the active session",
        "/logout".bold().cyan()
    );
    println!(
        "  {}                      – run the visual audit",
        "/audit".bold().cyan()
    );
    println!(
        "  {}                 – exit the CLI",
        "/quit  /exit".bold().cyan()
    );
    println!();
}

fn cmd_override(watchdog: &Arc<Mutex<SessionWatchdog>>, line: &str) {
    let rest = line.trim_start_matches("/override").trim();
    let mut parts = rest.splitn(2, char::is_whitespace);
    let badge = parts.next().filter(|s| !s.is_empty());
    let intent = parts.next().map(str::trim);

    let (Some(badge), Some(intent)) = (badge, intent) else {
        println!(
            "Usage: {} e.g. {}",
            "/override <badge> <intent…>".bold(),
            "/override MAINT-900 start maintenance".dimmed()
        );
        return;
    };

    let mut wd = lock(watchdog);
    match wd.request_override(Some(badge), Some(intent)) {
        Ok(true) => {
            // Grant just succeeded, so a clearance is guaranteed to be held.
            let (name, tier) = wd
                .active_clearance()
                .map(|c| (c.name.clone(), c.tier_rank))
                .unwrap_or(("?".to_string(), 0));
            println!(
                "{} {} (Tier {}). Keep confirming presence with {}.",
                "✓ Override granted:".green().bold(),
                name.bold(),
                tier,
                "/confirm".bold().cyan()
            );
        }
        Ok(false) => {
            println!(
                "{} Check the badge ID and intent phrase.",
                "✗ Override denied.".red().bold()
            );
        }
        Err(e) => {
            println!("{}: {}", "Override fault".red().bold(), e);
        }
    }
}

fn cmd_confirm(watchdog: &Arc<Mutex<SessionWatchdog>>) {
    let report = lock(watchdog).maintenance_pulse(true);
    if report.still_active {
        println!("{}", report.message.green());
    } else {
        println!("{}", report.message.red().bold());
    }
}

fn cmd_status(watchdog: &Arc<Mutex<SessionWatchdog>>, dashboard: &Dashboard) {
    let (snapshot, timeout_secs) = {
        let wd = lock(watchdog);
        (wd.telemetry(), wd.config().maintenance_timeout_secs)
    };
    dashboard.display(&snapshot, timeout_secs);
    println!();
}

fn cmd_logout(watchdog: &Arc<Mutex<SessionWatchdog>>) {
    let mut wd = lock(watchdog);
    if wd.is_override_active() {
        wd.secure_logout();
        println!("{}", "✓ Session terminated. Cell back in safe mode.".green());
    } else {
        println!("No active session.");
    }
}
