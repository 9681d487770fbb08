//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::MIN_POLL_INTERVAL_MS;
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [simconnect] section
    if let Some(section) = ini.section(Some("simconnect")) {
        if let Some(v) = section.get("app_name") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid(
                    "simconnect",
                    "app_name",
                    v,
                    "must not be empty",
                ));
            }
            config.simconnect.app_name = v.to_string();
        }
        if let Some(v) = section.get("retry_interval_ms") {
            config.simconnect.retry_interval_ms = parse_positive(v).ok_or_else(|| {
                invalid(
                    "simconnect",
                    "retry_interval_ms",
                    v,
                    "must be a positive integer (milliseconds)",
                )
            })?;
        }
        if let Some(v) = section.get("library_path") {
            let v = v.trim();
            if !v.is_empty() {
                config.simconnect.library_path = Some(expand_tilde(v));
            }
        }
    }

    // [poll] section
    if let Some(section) = ini.section(Some("poll")) {
        if let Some(v) = section.get("interval_ms") {
            config.poll.interval_ms = parse_positive(v)
                .filter(|ms| *ms >= MIN_POLL_INTERVAL_MS)
                .ok_or_else(|| {
                    invalid(
                        "poll",
                        "interval_ms",
                        v,
                        &format!("must be an integer >= {} (milliseconds)", MIN_POLL_INTERVAL_MS),
                    )
                })?;
        }
    }

    // [reaction] section
    if let Some(section) = ini.section(Some("reaction")) {
        if let Some(v) = section.get("log_debounce_secs") {
            config.reaction.log_debounce_secs = v.trim().parse().map_err(|_| {
                invalid(
                    "reaction",
                    "log_debounce_secs",
                    v,
                    "must be a non-negative integer (seconds)",
                )
            })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|v| *v > 0)
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
