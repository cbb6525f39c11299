use std::path::{Path, PathBuf};

use crate::remover::CleanupRequest;
use crate::utils;

/// Folders cleaned when the config does not name any, with what they hold.
pub const DEFAULT_FOLDERS: &[(&str, &str)] = &[
    ("Intermediate", "Build cache and temp files"),
    ("Binaries", "Compiled binaries"),
    ("Saved", "Editor settings, logs, crashes"),
    (".vs", "Visual Studio cache"),
];

/// One folder under the project directory that a cleanup run deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupTarget {
    pub name: String,
    pub description: String,
    pub path: PathBuf,
}

impl CleanupTarget {
    /// Recursive size in bytes, or `None` when the folder is absent.
    pub fn measure(&self) -> Option<u64> {
        if self.path.is_dir() {
            Some(utils::dir_size(&self.path))
        } else {
            None
        }
    }
}

pub fn default_folder_names() -> Vec<String> {
    DEFAULT_FOLDERS.iter().map(|(name, _)| name.to_string()).collect()
}

fn describe(name: &str) -> &'static str {
    DEFAULT_FOLDERS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, description)| *description)
        .unwrap_or("Project cache folder")
}

/// Join each folder name onto `project_dir`, keeping the configured order and
/// dropping duplicates and names that would escape the project.
pub fn resolve_targets(project_dir: &Path, folders: &[String]) -> Vec<CleanupTarget> {
    let mut targets: Vec<CleanupTarget> = Vec::new();

    for name in folders {
        let name = name.trim().trim_end_matches(['/', '\\']);
        if !is_plain_name(name) {
            log::warn!("ignoring cache folder entry {name:?}: not a plain folder name");
            continue;
        }
        if targets.iter().any(|t| t.name == name) {
            continue;
        }
        targets.push(CleanupTarget {
            name: name.to_string(),
            description: describe(name).to_string(),
            path: project_dir.join(name),
        });
    }

    targets
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !Path::new(name).is_absolute()
}

/// The remover input for `targets`, in the same order.
pub fn request_for(targets: &[CleanupTarget]) -> CleanupRequest {
    CleanupRequest::new(targets.iter().map(|t| t.path.clone()))
}
