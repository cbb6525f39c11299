use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cleancache",
    about = "Delete project cache and build folders, then restart the editor",
    version
)]
pub struct Cli {
    /// Settings file (default: <config dir>/cleancache/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Clone, Default)]
pub struct ProjectArgs {
    /// Project root containing the cache folders (default: current directory)
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Folder to clean instead of the configured list (repeatable)
    #[arg(long = "folder")]
    pub folders: Vec<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the cache folders and their sizes without deleting anything
    List {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Delete the cache folders from the terminal
    Clean {
        #[command(flatten)]
        project: ProjectArgs,

        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,

        /// Never relaunch the editor afterwards
        #[arg(long)]
        no_restart: bool,
    },

    /// Open the cleanup window (default)
    Gui {
        #[command(flatten)]
        project: ProjectArgs,
    },
}
