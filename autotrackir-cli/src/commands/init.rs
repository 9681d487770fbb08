//! Init command - write a default configuration file.

use std::path::PathBuf;

use autotrackir::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Write the default configuration to `path` (or the default location).
///
/// An existing file is left alone unless `force` is set.
pub fn run(path: Option<PathBuf>, force: bool) -> Result<(), CliError> {
    let path = path.unwrap_or_else(config_file_path);

    if force {
        ConfigFile::default().save_to(&path)?;
        println!("Wrote default configuration to {}", path.display());
    } else if ConfigFile::ensure_exists_at(&path)? {
        println!("Created configuration file {}", path.display());
    } else {
        println!(
            "Configuration file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_and_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");

        run(Some(path.clone()), false).unwrap();
        std::fs::write(&path, "[poll]\ninterval_ms = 900\n").unwrap();
        run(Some(path.clone()), false).unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.poll.interval_ms, 900);
    }

    #[test]
    fn test_init_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(&path, "[poll]\ninterval_ms = 900\n").unwrap();

        run(Some(path.clone()), true).unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }
}
