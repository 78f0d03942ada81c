//! Platform paths for settings, saved configuration and traces.
//!
//! Directories follow the platform conventions reported by `dirs`:
//! `~/.local/share` and `~/.config` on Linux, `~/Library/Application Support`
//! on macOS, `%APPDATA%` on Windows. When a platform directory cannot be
//! determined the current directory is used.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "zentao-desk";

/// Returns the default data directory, `<data_dir>/zentao-desk`.
///
/// Saved configuration and the trace file live here.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Returns the settings file path, `<config_dir>/zentao-desk/settings.toml`.
#[must_use]
pub fn settings_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("settings.toml")
}

#[must_use]
pub fn config_file(data_dir: &Path) -> PathBuf {
    data_dir.join("config.json")
}

#[must_use]
pub fn trace_file(data_dir: &Path) -> PathBuf {
    data_dir.join("zentao-desk-trace.jsonl")
}

/// Marker kept by the offline backend while logged in.
#[must_use]
pub fn token_file(data_dir: &Path) -> PathBuf {
    data_dir.join("offline-token")
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a tilde, and all paths when no home directory is known, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use zentao_desk::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (rest, Some(home)) if rest.starts_with("~/") => home.join(&rest[2..]),
        (other, _) => PathBuf::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_data_dir() {
        let dir = Path::new("/data");
        assert_eq!(config_file(dir), PathBuf::from("/data/config.json"));
        assert_eq!(trace_file(dir), PathBuf::from("/data/zentao-desk-trace.jsonl"));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~"), home);
            assert_eq!(expand_tilde("~/zentao"), home.join("zentao"));
        }
        assert_eq!(expand_tilde("relative/~"), PathBuf::from("relative/~"));
    }

    #[test]
    fn default_dirs_are_app_specific() {
        assert!(default_data_dir().ends_with("zentao-desk"));
        assert!(settings_file().ends_with("zentao-desk/settings.toml"));
    }
}
