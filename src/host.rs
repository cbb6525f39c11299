use std::process::{Command, Stdio};

use log::{info, warn};

use crate::error::{Error, Result};

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Work in progress; stays visible until replaced.
    Pending,
    Success,
    Info,
    Failure,
}

/// What the cleanup session needs from the application it runs inside.
pub trait Host {
    /// Ask a yes/no question. `true` means go ahead.
    fn confirm(&mut self, message: &str) -> bool;

    fn notify(&mut self, message: &str, severity: Severity);

    /// Relaunch the application. Called at most once per session.
    fn restart(&mut self) -> Result<()>;

    /// When false the session neither waits for nor asks about a restart.
    fn restart_enabled(&self) -> bool {
        true
    }
}

/// Spawn `command` (program followed by its arguments) detached from us.
/// An empty command only logs; the caller still shuts down.
pub fn relaunch(command: &[String]) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        warn!("no restart command configured, not relaunching");
        return Ok(());
    };

    info!("relaunching: {}", command.join(" "));
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| Error::Restart {
            program: program.clone(),
            source,
        })?;
    Ok(())
}
