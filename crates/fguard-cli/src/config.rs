//! Configuration Vault – reads/writes `~/.fguard/config.toml`.

use std::fs;
use std::path::PathBuf;

use fguard_types::AccessConfig;
use serde::{Deserialize, Serialize};

/// Persisted user configuration stored in `~/.fguard/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Access-control parameters injected into the session watchdog:
    /// watchdog timeout, reserved heartbeat threshold, badge directory.
    #[serde(default)]
    pub access: AccessConfig,

    /// Period of the background pulse ticker, in seconds.
    #[serde(default = "default_pulse_interval")]
    pub pulse_interval_secs: f64,
}

fn default_pulse_interval() -> f64 {
    1.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access: AccessConfig::default(),
            pulse_interval_secs: default_pulse_interval(),
        }
    }
}

/// Return the path to `~/.fguard/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".fguard").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config = toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    validate(&cfg)?;
    Ok(Some(cfg))
}

/// Reject configurations the watchdog cannot safely run with.
pub(crate) fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.access.maintenance_timeout_secs <= 0.0 {
        return Err("maintenance_timeout_secs must be > 0".to_string());
    }
    if cfg.pulse_interval_secs <= 0.0 {
        return Err("pulse_interval_secs must be > 0".to_string());
    }
    Ok(())
}

/// Apply `FGUARD_*` environment variable overrides to `cfg`.
///
/// Called by `main` after loading; kept separate from [`load_from`] so
/// file-based tests never read the process environment.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `FGUARD_TIMEOUT_SECS` | `access.maintenance_timeout_secs` |
/// | `FGUARD_HEARTBEAT_SECS` | `access.heartbeat_threshold_secs` |
/// | `FGUARD_PULSE_INTERVAL_SECS` | `pulse_interval_secs` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("FGUARD_TIMEOUT_SECS")
        && let Ok(secs) = v.parse::<f64>()
    {
        cfg.access.maintenance_timeout_secs = secs;
    }
    if let Ok(v) = std::env::var("FGUARD_HEARTBEAT_SECS")
        && let Ok(secs) = v.parse::<f64>()
    {
        cfg.access.heartbeat_threshold_secs = secs;
    }
    if let Ok(v) = std::env::var("FGUARD_PULSE_INTERVAL_SECS")
        && let Ok(secs) = v.parse::<f64>()
    {
        cfg.pulse_interval_secs = secs;
    }
}

/// Save the config to disk, creating `~/.fguard/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create config directory: {}", e))?;
        // Restrict the config directory to the owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    // Write the file with owner-only read/write (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert!((loaded.access.maintenance_timeout_secs - 300.0).abs() < f64::EPSILON);
        assert!((loaded.pulse_interval_secs - 1.0).abs() < f64::EPSILON);
        assert_eq!(loaded.access.auth_directory.len(), 3);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn config_path_points_to_fguard_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".fguard"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let file_meta = std::fs::metadata(&path).expect("file metadata");
        let file_mode = file_meta.permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "config file must have 0o600 permissions");

        let dir_meta = std::fs::metadata(path.parent().unwrap()).expect("dir metadata");
        let dir_mode = dir_meta.permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700, "config directory must have 0o700 permissions");
    }

    #[test]
    fn non_positive_timeout_is_a_load_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let mut cfg = Config::default();
        cfg.access.maintenance_timeout_secs = 0.0;
        save_to(&cfg, &path).expect("save");

        let result = load_from(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("maintenance_timeout_secs"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(&path, "[access]\nmaintenance_timeout_secs = 60.0\n").expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert!((loaded.access.maintenance_timeout_secs - 60.0).abs() < f64::EPSILON);
        // Unspecified fields come from the serde defaults.
        assert!((loaded.access.heartbeat_threshold_secs - 1.0).abs() < f64::EPSILON);
        assert_eq!(loaded.access.auth_directory.len(), 3);
    }

    #[test]
    fn apply_env_overrides_changes_timeout() {
        // SAFETY: single-threaded test; no other thread reads this env-var.
        unsafe { std::env::set_var("FGUARD_TIMEOUT_SECS", "45.5") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.access.maintenance_timeout_secs - 45.5).abs() < f64::EPSILON);
        unsafe { std::env::remove_var("FGUARD_TIMEOUT_SECS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_values() {
        // SAFETY: single-threaded test; no other thread reads this env-var.
        unsafe { std::env::set_var("FGUARD_PULSE_INTERVAL_SECS", "not-a-number") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.pulse_interval_secs - 1.0).abs() < f64::EPSILON);
        unsafe { std::env::remove_var("FGUARD_PULSE_INTERVAL_SECS") };
    }

    #[test]
    fn validate_rejects_non_positive_pulse_interval() {
        let mut cfg = Config::default();
        cfg.pulse_interval_secs = 0.0;
        assert!(validate(&cfg).is_err());
    }
}
