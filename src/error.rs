use std::path::PathBuf;

use thiserror::Error;

/// Application-level failures. Directory removal problems are not here; they
/// end up in `CleanupOutcome::failures`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("project directory {0} does not exist")]
    ProjectDir(PathBuf),

    #[error("failed to restart {program}: {source}")]
    Restart {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cleanup worker stopped before reporting a result")]
    WorkerLost,

    #[error("window error: {0}")]
    Gui(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
