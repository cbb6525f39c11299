use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::platform::{self, Platform};

/// Why a directory could not be removed.
#[derive(Debug, Error)]
pub enum RemoveError {
    #[error("path not found")]
    PathNotFound,

    #[error("{strategy} failed: {reason}")]
    DeleteAttemptFailed {
        strategy: &'static str,
        reason: String,
    },

    #[error("all strategies exhausted")]
    AllStrategiesExhausted { attempts: Vec<RemoveError> },
}

impl RemoveError {
    fn attempt(strategy: &'static str, reason: impl ToString) -> Self {
        RemoveError::DeleteAttemptFailed {
            strategy,
            reason: reason.to_string(),
        }
    }
}

/// Terminal state of one requested path.
#[derive(Debug)]
pub enum PathState {
    Skipped,
    Deleted { strategy: &'static str },
    Failed(RemoveError),
}

/// A directory that survived every strategy.
#[derive(Debug)]
pub struct DeleteFailure {
    pub path: PathBuf,
    pub reason: RemoveError,
}

/// Ordered list of directories to delete in one run.
#[derive(Debug, Clone, Default)]
pub struct CleanupRequest {
    pub paths: Vec<PathBuf>,
}

impl CleanupRequest {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of `remove_all`. Every input path is in exactly one of the three lists.
#[derive(Debug, Default)]
pub struct CleanupOutcome {
    pub deleted: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<DeleteFailure>,
}

impl CleanupOutcome {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

type Strategy = fn(&dyn Platform, &Path) -> Result<(), RemoveError>;

/// Tried in order until one leaves the path gone.
const STRATEGIES: [(&str, Strategy); 3] = [
    ("bulk removal", bulk_remove),
    ("manual recursive removal", manual_remove),
    ("external force-delete", force_delete),
];

/// Delete every directory in `request`, in order. Never fails as a whole;
/// each path ends up deleted, skipped or failed.
pub fn remove_all(platform: &dyn Platform, request: &CleanupRequest) -> CleanupOutcome {
    let mut outcome = CleanupOutcome::default();

    for path in &request.paths {
        match remove_one(platform, path) {
            PathState::Skipped => outcome.skipped.push(path.clone()),
            PathState::Deleted { strategy } => {
                info!("successfully deleted {} ({strategy})", path.display());
                outcome.deleted.push(path.clone());
            }
            PathState::Failed(reason) => outcome.failures.push(DeleteFailure {
                path: path.clone(),
                reason,
            }),
        }
    }

    info!(
        "cleanup finished: {} deleted, {} skipped, {} failed",
        outcome.deleted.len(),
        outcome.skipped.len(),
        outcome.failures.len()
    );
    outcome
}

/// Run the strategy cascade for a single directory.
pub fn remove_one(platform: &dyn Platform, path: &Path) -> PathState {
    if let Err(e) = ensure_exists(platform, path) {
        info!("{e}, skipping: {}", path.display());
        return PathState::Skipped;
    }

    info!("attempting to delete folder: {}", path.display());
    let mut attempts = Vec::new();

    for (name, strategy) in STRATEGIES {
        let result = strategy(platform, path).and_then(|()| {
            if platform.exists(path) {
                Err(RemoveError::attempt(name, "directory still present"))
            } else {
                Ok(())
            }
        });

        match result {
            Ok(()) => return PathState::Deleted { strategy: name },
            Err(e) => {
                warn!("{}: {e}", path.display());
                attempts.push(e);
            }
        }
    }

    error!("failed to delete folder: {}", path.display());
    PathState::Failed(RemoveError::AllStrategiesExhausted { attempts })
}

/// Only directories are cleaned; anything else at a target path is left alone.
fn ensure_exists(platform: &dyn Platform, path: &Path) -> Result<(), RemoveError> {
    if platform.is_dir(path) {
        Ok(())
    } else {
        Err(RemoveError::PathNotFound)
    }
}

fn bulk_remove(platform: &dyn Platform, path: &Path) -> Result<(), RemoveError> {
    platform
        .remove_tree(path)
        .map_err(|e| RemoveError::attempt("bulk removal", e))
}

fn manual_remove(platform: &dyn Platform, path: &Path) -> Result<(), RemoveError> {
    const NAME: &str = "manual recursive removal";

    // A read-only root would block removing its children.
    clear_readonly(platform, path);
    clear_contents(platform, path).map_err(|e| RemoveError::attempt(NAME, e))?;
    platform
        .remove_dir(path)
        .map_err(|e| RemoveError::attempt(NAME, e))
}

/// Depth-first delete of everything below `dir`. Files that refuse to go are
/// logged and left behind; only an unreadable directory fails the walk.
fn clear_contents(platform: &dyn Platform, dir: &Path) -> std::io::Result<()> {
    let entries = platform.list_dir(dir)?;

    let (dirs, files): (Vec<_>, Vec<_>) = entries.into_iter().partition(|e| e.is_dir);

    for file in &files {
        clear_readonly(platform, &file.path);
        if let Err(e) = platform.remove_file(&file.path) {
            warn!("could not delete file {}: {e}", file.path.display());
        }
    }

    for sub in &dirs {
        clear_readonly(platform, &sub.path);
        clear_contents(platform, &sub.path)?;
        if let Err(e) = platform.remove_dir(&sub.path) {
            warn!("could not delete directory {}: {e}", sub.path.display());
        }
    }

    Ok(())
}

fn clear_readonly(platform: &dyn Platform, path: &Path) {
    if let Err(e) = platform.clear_readonly(path) {
        debug!("could not clear read-only flag on {}: {e}", path.display());
    }
}

fn force_delete(platform: &dyn Platform, path: &Path) -> Result<(), RemoveError> {
    const NAME: &str = "external force-delete";

    let Some((program, args)) = platform::force_delete_command(path) else {
        return Err(RemoveError::attempt(NAME, "no force-delete command on this platform"));
    };

    let output = platform
        .exec(&program, &args)
        .map_err(|e| RemoveError::attempt(NAME, e))?;

    if !output.stdout.trim().is_empty() {
        debug!("{} stdout: {}", program.to_string_lossy(), output.stdout.trim());
    }
    if !output.stderr.trim().is_empty() {
        debug!("{} stderr: {}", program.to_string_lossy(), output.stderr.trim());
    }

    if output.success() {
        Ok(())
    } else {
        let code = output
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        Err(RemoveError::attempt(NAME, format!("exit code {code}")))
    }
}
