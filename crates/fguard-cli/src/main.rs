//! `fguard-cli` – FactoryGuard Command Line Interface
//!
//! This binary is the entry point for the cell's access stack.  It:
//!
//! 1. Initialises structured logging (`RUST_LOG`, `FGUARD_LOG_FORMAT=json`).
//! 2. Checks for `~/.fguard/config.toml`; runs a **First-Run Wizard** when
//!    the file is absent.
//! 3. Builds the single shared [`SessionWatchdog`] and starts the
//!    background pulse ticker (the dead-man's-switch timer loop).
//! 4. Intercepts **Ctrl-C** to run a secure logout before exiting.
//! 5. Drops the user into an **interactive REPL** with slash-commands
//!    (`/override`, `/confirm`, `/status`, `/logout`, `/audit`, `/help`).

mod audit;
mod config;
mod repl;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use colored::Colorize;
use tracing::warn;

use fguard_console::Dashboard;
use fguard_kernel::SessionWatchdog;
use fguard_types::AccessTelemetry;

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set FGUARD_LOG_FORMAT=json to emit newline-delimited JSON logs
    // suitable for log aggregators.  The CLI's user-facing output still
    // uses println! for UX consistency.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("FGUARD_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let mut cfg = match config::load() {
        Ok(Some(c)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            c
        }
        Ok(None) => run_first_run_wizard(),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    config::apply_env_overrides(&mut cfg);
    if let Err(e) = config::validate(&cfg) {
        println!("{}: {}", "Invalid configuration".red(), e);
        println!("  Using default configuration.");
        cfg = config::Config::default();
    }

    let pulse_interval = Duration::from_secs_f64(cfg.pulse_interval_secs);
    let timeout_secs = cfg.access.maintenance_timeout_secs;
    println!(
        "  Watchdog timeout {}  ·  pulse every {}",
        format!("{timeout_secs}s").yellow(),
        format!("{}s", cfg.pulse_interval_secs).yellow()
    );

    let watchdog = Arc::new(Mutex::new(SessionWatchdog::new(cfg.access.clone())));
    let shutdown = Arc::new(AtomicBool::new(false));

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    {
        let watchdog = Arc::clone(&watchdog);
        let shutdown = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || {
            println!();
            println!(
                "{}",
                "⚠  Ctrl-C received – closing the override session …".yellow().bold()
            );
            lock(&watchdog).secure_logout();
            println!("{}", "  ✓ Cell back in safe mode. Exiting.".green());
            shutdown.store(true, Ordering::SeqCst);
        }) {
            warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
        }
    }

    // ── Pulse ticker ──────────────────────────────────────────────────────
    // The periodic timer loop: every tick delivers an unconfirmed pulse, so
    // an abandoned session expires even if nobody touches the REPL.
    // Presence is only refreshed by the operator's /confirm command.
    {
        let watchdog = Arc::clone(&watchdog);
        let shutdown = Arc::clone(&shutdown);
        thread::spawn(move || {
            let dashboard = Dashboard::new();
            while !shutdown.load(Ordering::SeqCst) {
                thread::sleep(pulse_interval);
                let report = lock(&watchdog).maintenance_pulse(false);
                if !report.still_active {
                    // Expiry transition: make it loud, then repaint standby.
                    println!("\n{}", report.message.red().bold());
                    dashboard.display(&AccessTelemetry::standby(), timeout_secs);
                    println!();
                }
            }
        });
    }

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive REPL ──────────────────────────────────────────────────
    repl::run(shutdown, watchdog);
}

/// Lock the shared watchdog, recovering from poisoning.
///
/// A poisoned lock means another thread panicked mid-call; the session
/// record itself is still consistent, so all callers continue with the
/// inner value rather than tearing down the safety loop.
pub(crate) fn lock(watchdog: &Arc<Mutex<SessionWatchdog>>) -> MutexGuard<'_, SessionWatchdog> {
    watchdog
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() -> config::Config {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║     FactoryGuard First-Run Wizard    ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Let's set up the watchdog.\n");

    let mut cfg = config::Config::default();

    let timeout = prompt_line(
        &format!(
            "  Watchdog timeout in seconds [{}]: ",
            cfg.access.maintenance_timeout_secs
        ),
        &cfg.access.maintenance_timeout_secs.to_string(),
    );
    if let Ok(secs) = timeout.trim().parse::<f64>()
        && secs > 0.0
    {
        cfg.access.maintenance_timeout_secs = secs;
    }

    let interval = prompt_line(
        &format!("  Pulse interval in seconds [{}]: ", cfg.pulse_interval_secs),
        &cfg.pulse_interval_secs.to_string(),
    );
    if let Ok(secs) = interval.trim().parse::<f64>()
        && secs > 0.0
    {
        cfg.pulse_interval_secs = secs;
    }

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }

    cfg
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"    ______           __                  "#.bold().cyan());
    println!("{}", r#"   / ____/___ ______/ /_____  _______  __"#.bold().cyan());
    println!("{}", r#"  / /_  / __ `/ ___/ __/ __ \/ ___/ / / /"#.bold().cyan());
    println!("{}", r#" / __/ / /_/ / /__/ /_/ /_/ / /  / /_/ / "#.bold().cyan());
    println!("{}", r#"/_/    \__,_/\___/\__/\____/_/   \__, /  "#.bold().cyan());
    println!("{}", r#"           G U A R D            /____/   "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "FactoryGuard".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Operator Override & Presence Watchdog");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_line(msg: &str, default: &str) -> String {
    use std::io::{BufRead, Write};
    print!("{}", msg);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let t = line.trim().to_string();
            if t.is_empty() { default.to_string() } else { t }
        }
        Err(_) => default.to_string(),
    }
}
