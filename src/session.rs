use std::fmt::Write as _;
use std::sync::mpsc;
use std::time::Duration;

use log::info;

use crate::error::{Error, Result};
use crate::host::{Host, Severity};
use crate::platform::Platform;
use crate::remover::{self, CleanupOutcome, CleanupRequest};
use crate::targets::CleanupTarget;
use crate::utils;

pub const CONFIRM_TITLE: &str = "Cleanup Cache and Restart";
pub const STARTED_MESSAGE: &str = "Starting cleanup process... This may take a few seconds.";
pub const NOTHING_MESSAGE: &str = "No cache folders found to clean up.";
pub const RESTART_ANYWAY_QUESTION: &str =
    "Some files could not be deleted. Do you still want to restart the editor?";

/// What to do once the worker reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Everything requested is gone; announce and restart.
    Restart { deleted: usize },
    /// Nothing existed, nothing failed.
    NothingToClean,
    /// At least one folder survived. `report` lists them, one per line.
    Errors { deleted: usize, report: String },
}

impl Completion {
    pub fn severity(&self) -> Severity {
        match self {
            Completion::Restart { .. } => Severity::Success,
            Completion::NothingToClean => Severity::Info,
            Completion::Errors { .. } => Severity::Failure,
        }
    }

    /// `restart_delay` of `None` means no restart will follow.
    pub fn message(&self, restart_delay: Option<Duration>) -> String {
        match self {
            Completion::Restart { deleted } => match restart_delay {
                Some(delay) => format!(
                    "Successfully cleaned up {deleted} folders. Restarting editor in {} seconds...",
                    delay.as_secs()
                ),
                None => format!("Successfully cleaned up {deleted} folders."),
            },
            Completion::NothingToClean => NOTHING_MESSAGE.to_string(),
            Completion::Errors { report, .. } => {
                format!("Cleanup completed with errors:\n{report}")
            }
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Cancelled,
    NothingToClean,
    Restarted,
    /// Cleanup ran but no restart followed: the user declined after
    /// errors, or the host has restarting turned off.
    Finished,
}

pub fn completion(outcome: &CleanupOutcome) -> Completion {
    if !outcome.failures.is_empty() {
        let mut report = String::new();
        for failure in &outcome.failures {
            let _ = writeln!(
                report,
                "Failed to delete: {} ({})",
                failure.path.display(),
                failure.reason
            );
        }
        Completion::Errors {
            deleted: outcome.deleted_count(),
            report,
        }
    } else if outcome.deleted_count() > 0 {
        Completion::Restart {
            deleted: outcome.deleted_count(),
        }
    } else {
        Completion::NothingToClean
    }
}

/// Text of the confirmation dialog. `sizes` is parallel to `targets`.
pub fn confirmation_message(targets: &[CleanupTarget], sizes: &[Option<u64>]) -> String {
    let mut msg = String::from(
        "This will delete intermediate files, binaries, and saved data, then restart the editor.\n\n\
         The following folders will be deleted:\n",
    );
    for (idx, target) in targets.iter().enumerate() {
        let size = match sizes.get(idx).copied().flatten() {
            Some(bytes) => format!(", {}", utils::format_size(bytes)),
            None => String::new(),
        };
        let _ = writeln!(msg, "\u{2022} {}/ ({}{size})", target.name, target.description);
    }
    msg.push_str(
        "\nWARNING: This will close the editor and may take several minutes.\n\
         Save your work before continuing!\n\n\
         Are you sure you want to continue?",
    );
    msg
}

/// Run `remove_all` on a background thread. The receiver yields exactly one
/// outcome, or disconnects if the worker panicked.
pub fn spawn_cleanup<P>(platform: P, request: CleanupRequest) -> mpsc::Receiver<CleanupOutcome>
where
    P: Platform + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let outcome = remover::remove_all(&platform, &request);
        let _ = tx.send(outcome);
    });
    rx
}

/// The whole flow for hosts that can block: confirm, clean off-thread,
/// report, restart.
pub fn run<H, P>(
    host: &mut H,
    platform: P,
    targets: &[CleanupTarget],
    restart_delay: Duration,
) -> Result<(SessionEnd, CleanupOutcome)>
where
    H: Host,
    P: Platform + Send + 'static,
{
    let sizes: Vec<Option<u64>> = targets.iter().map(CleanupTarget::measure).collect();
    if !host.confirm(&confirmation_message(targets, &sizes)) {
        info!("cleanup cancelled");
        return Ok((SessionEnd::Cancelled, CleanupOutcome::default()));
    }

    host.notify(STARTED_MESSAGE, Severity::Pending);
    let outcome = spawn_cleanup(platform, crate::targets::request_for(targets))
        .recv()
        .map_err(|_| Error::WorkerLost)?;

    let done = completion(&outcome);
    let can_restart = host.restart_enabled();
    host.notify(
        &done.message(can_restart.then_some(restart_delay)),
        done.severity(),
    );

    let end = match done {
        Completion::NothingToClean => SessionEnd::NothingToClean,
        _ if !can_restart => SessionEnd::Finished,
        Completion::Restart { .. } => {
            std::thread::sleep(restart_delay);
            host.restart()?;
            SessionEnd::Restarted
        }
        Completion::Errors { .. } => {
            if host.confirm(RESTART_ANYWAY_QUESTION) {
                host.restart()?;
                SessionEnd::Restarted
            } else {
                SessionEnd::Finished
            }
        }
    };
    Ok((end, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{DirEntry, ExecOutput, NativePlatform};
    use crate::targets::resolve_targets;
    use std::ffi::{OsStr, OsString};
    use std::io;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct RecordingHost {
        no_restart: bool,
        answers: Vec<bool>,
        questions: Vec<String>,
        notices: Vec<(String, Severity)>,
        restarts: usize,
    }

    impl Host for RecordingHost {
        fn confirm(&mut self, message: &str) -> bool {
            self.questions.push(message.to_string());
            if self.answers.is_empty() {
                false
            } else {
                self.answers.remove(0)
            }
        }

        fn notify(&mut self, message: &str, severity: Severity) {
            self.notices.push((message.to_string(), severity));
        }

        fn restart(&mut self) -> Result<()> {
            self.restarts += 1;
            Ok(())
        }

        fn restart_enabled(&self) -> bool {
            !self.no_restart
        }
    }

    /// Every directory under `root` exists and none of them can be deleted.
    struct StuckPlatform {
        root: PathBuf,
    }

    impl Platform for StuckPlatform {
        fn exists(&self, path: &Path) -> bool {
            path.starts_with(&self.root)
        }

        fn is_dir(&self, path: &Path) -> bool {
            path.starts_with(&self.root)
        }

        fn list_dir(&self, _path: &Path) -> io::Result<Vec<DirEntry>> {
            Ok(vec![])
        }

        fn remove_tree(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "in use"))
        }

        fn remove_file(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "in use"))
        }

        fn remove_dir(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "in use"))
        }

        fn clear_readonly(&self, _path: &Path) -> io::Result<()> {
            Ok(())
        }

        fn exec(&self, _program: &OsStr, _args: &[OsString]) -> io::Result<ExecOutput> {
            Ok(ExecOutput {
                code: Some(1),
                ..Default::default()
            })
        }
    }

    fn stuck_run(host: &mut RecordingHost) -> SessionEnd {
        let root = PathBuf::from("/stuck-project");
        let targets = resolve_targets(&root, &["Saved".to_string()]);
        let (end, outcome) =
            run(host, StuckPlatform { root }, &targets, Duration::ZERO).unwrap();
        assert_eq!(outcome.failures.len(), 1);
        end
    }

    fn project_with(folders: &[&str]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for name in folders {
            let dir = tmp.path().join(name);
            std::fs::create_dir_all(dir.join("sub")).unwrap();
            std::fs::write(dir.join("sub/file.bin"), b"cache").unwrap();
        }
        tmp
    }

    fn all_targets(root: &std::path::Path) -> Vec<CleanupTarget> {
        resolve_targets(root, &crate::targets::default_folder_names())
    }

    #[test]
    fn declining_deletes_nothing() {
        let project = project_with(&["Intermediate"]);
        let mut host = RecordingHost::default();

        let (end, _) = run(&mut host, NativePlatform, &all_targets(project.path()), Duration::ZERO)
            .unwrap();

        assert_eq!(end, SessionEnd::Cancelled);
        assert!(project.path().join("Intermediate").exists());
        assert!(host.notices.is_empty());
        assert_eq!(host.restarts, 0);
    }

    #[test]
    fn successful_cleanup_restarts() {
        let project = project_with(&["Intermediate", "Saved"]);
        let mut host = RecordingHost {
            answers: vec![true],
            ..Default::default()
        };

        let (end, outcome) =
            run(&mut host, NativePlatform, &all_targets(project.path()), Duration::ZERO).unwrap();

        assert_eq!(end, SessionEnd::Restarted);
        assert_eq!(outcome.deleted_count(), 2);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(host.restarts, 1);
        assert_eq!(host.notices[0].1, Severity::Pending);
        assert_eq!(host.notices[1].1, Severity::Success);
        assert!(host.notices[1].0.contains("Successfully cleaned up 2 folders"));
        assert!(host.questions[0].contains("Intermediate/ (Build cache and temp files"));
    }

    #[test]
    fn nothing_to_clean_does_not_restart() {
        let project = project_with(&[]);
        let mut host = RecordingHost {
            answers: vec![true],
            ..Default::default()
        };

        let (end, _) = run(&mut host, NativePlatform, &all_targets(project.path()), Duration::ZERO)
            .unwrap();

        assert_eq!(end, SessionEnd::NothingToClean);
        assert_eq!(host.restarts, 0);
        assert_eq!(host.notices.last().unwrap().1, Severity::Info);
    }

    #[test]
    fn failures_then_yes_restarts_anyway() {
        let mut host = RecordingHost {
            answers: vec![true, true],
            ..Default::default()
        };

        assert_eq!(stuck_run(&mut host), SessionEnd::Restarted);
        assert_eq!(host.questions.len(), 2);
        assert_eq!(host.questions[1], RESTART_ANYWAY_QUESTION);
        assert_eq!(host.restarts, 1);
        assert_eq!(host.notices.last().unwrap().1, Severity::Failure);
    }

    #[test]
    fn failures_then_no_finishes_without_restart() {
        let mut host = RecordingHost {
            answers: vec![true, false],
            ..Default::default()
        };

        assert_eq!(stuck_run(&mut host), SessionEnd::Finished);
        assert_eq!(host.questions[1], RESTART_ANYWAY_QUESTION);
        assert_eq!(host.restarts, 0);
    }

    #[test]
    fn restart_disabled_skips_question_and_countdown() {
        let mut host = RecordingHost {
            no_restart: true,
            answers: vec![true, true],
            ..Default::default()
        };
        assert_eq!(stuck_run(&mut host), SessionEnd::Finished);
        assert_eq!(host.questions.len(), 1);
        assert_eq!(host.restarts, 0);

        let project = project_with(&["Binaries"]);
        let mut host = RecordingHost {
            no_restart: true,
            answers: vec![true],
            ..Default::default()
        };
        let (end, _) = run(
            &mut host,
            NativePlatform,
            &all_targets(project.path()),
            Duration::from_secs(3600),
        )
        .unwrap();

        assert_eq!(end, SessionEnd::Finished);
        assert_eq!(host.restarts, 0);
        let (message, severity) = host.notices.last().unwrap();
        assert_eq!(*severity, Severity::Success);
        assert_eq!(message, "Successfully cleaned up 1 folders.");
    }

    #[test]
    fn error_report_lists_each_failed_folder() {
        let outcome = CleanupOutcome {
            deleted: vec!["/proj/Saved".into()],
            skipped: vec![],
            failures: vec![remover::DeleteFailure {
                path: "/proj/Binaries".into(),
                reason: remover::RemoveError::AllStrategiesExhausted { attempts: vec![] },
            }],
        };

        let done = completion(&outcome);
        assert_eq!(done.severity(), Severity::Failure);
        let text = done.message(Some(Duration::from_secs(3)));
        assert!(text.starts_with("Cleanup completed with errors:"));
        assert!(text.contains("/proj/Binaries (all strategies exhausted)"));
    }

    #[test]
    fn failures_with_zero_deleted_are_still_errors() {
        let outcome = CleanupOutcome {
            failures: vec![remover::DeleteFailure {
                path: "/proj/.vs".into(),
                reason: remover::RemoveError::AllStrategiesExhausted { attempts: vec![] },
            }],
            ..Default::default()
        };
        assert!(matches!(completion(&outcome), Completion::Errors { deleted: 0, .. }));
    }

    #[test]
    fn confirmation_lists_sizes_when_known() {
        let targets = resolve_targets(
            std::path::Path::new("/proj"),
            &["Saved".to_string(), ".vs".to_string()],
        );
        let msg = confirmation_message(&targets, &[Some(2_048), None]);
        assert!(msg.contains("\u{2022} Saved/ (Editor settings, logs, crashes, 2.00 KB)"));
        assert!(msg.contains("\u{2022} .vs/ (Visual Studio cache)\n"));
        assert!(msg.ends_with("Are you sure you want to continue?"));
    }
}
