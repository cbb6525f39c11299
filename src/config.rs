//! Settings file handling.
//!
//! Stored as TOML at `<config dir>/cleancache/config.toml`
//! (`~/.config` on Linux, `~/Library/Application Support` on macOS,
//! `%APPDATA%` on Windows). A missing file means defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::targets;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Folder names under the project directory to delete, in order.
    pub folders: Vec<String>,

    /// Program and arguments used to relaunch the editor. Empty = no relaunch.
    pub restart_command: Vec<String>,

    /// Seconds between the success notice and the restart.
    pub restart_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            folders: targets::default_folder_names(),
            restart_command: Vec::new(),
            restart_delay_secs: 3,
        }
    }
}

impl Config {
    /// Load from `explicit` if given (must exist), else from the default
    /// location if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cleancache").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_layout() {
        let config = Config::default();
        assert_eq!(config.folders, ["Intermediate", "Binaries", "Saved", ".vs"]);
        assert!(config.restart_command.is_empty());
        assert_eq!(config.restart_delay_secs, 3);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"restart_command = ["UnrealEditor", "/proj/Game.uproject"]"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.restart_command, ["UnrealEditor", "/proj/Game.uproject"]);
        assert_eq!(config.folders.len(), 4);
        assert_eq!(config.restart_delay_secs, 3);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "folderz = [\"Saved\"]\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&tmp.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
