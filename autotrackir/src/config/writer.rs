//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let library_path = config
        .simconnect
        .library_path
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();

    format!(
        r#"[simconnect]
; Name this client announces to the simulator
app_name = {}
; Milliseconds between connection attempts while waiting for the simulator (default: 1000)
retry_interval_ms = {}
; Path to SimConnect.dll. If empty, the DLL next to the executable is used
library_path = {}

[poll]
; Milliseconds between polls of TRACK IR ENABLE and CAMERA STATE (default: 350)
interval_ms = {}

[reaction]
; Minimum seconds between "TrackIR disabled by simulator" log lines (default: 10)
; TrackIR is re-enabled on every poll regardless of this setting
log_debounce_secs = {}

[logging]
; Log file path. The file is truncated on every start
file = {}
"#,
        config.simconnect.app_name,
        config.simconnect.retry_interval_ms,
        library_path,
        config.poll.interval_ms,
        config.reaction.log_debounce_secs,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_saved_config_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.poll.interval_ms = 500;
        config.simconnect.library_path = Some(PathBuf::from("/opt/SimConnect.dll"));
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_file_is_commented() {
        let content = to_config_string(&ConfigFile::default());

        assert!(content.contains("[simconnect]"));
        assert!(content.contains("interval_ms = 350"));
        assert!(content.contains("log_debounce_secs = 10"));
        assert!(content.contains("library_path = \n"));
        assert!(content.lines().any(|line| line.starts_with("; ")));
    }
}
