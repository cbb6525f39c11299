use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One child of a directory as returned by `Platform::list_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Exit status and captured streams of a finished child process.
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// The filesystem and process primitives the remover is built on.
pub trait Platform {
    fn exists(&self, path: &Path) -> bool;

    /// True only for a real directory; files and symlinks are not.
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of `path`. Symlinks are reported as non-directories
    /// so the walk never follows them.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Delete a whole tree in one call.
    fn remove_tree(&self, path: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Delete an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Make `path` writable by its owner.
    fn clear_readonly(&self, path: &Path) -> io::Result<()>;

    /// Run a program to completion and capture its output.
    fn exec(&self, program: &OsStr, args: &[OsString]) -> io::Result<ExecOutput>;
}

/// `Platform` backed by `std::fs` and `std::process`.
pub struct NativePlatform;

impl Platform for NativePlatform {
    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling link still counts as present
        path.symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.symlink_metadata().map(|m| m.is_dir()).unwrap_or(false)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            entries.push(DirEntry {
                path: entry.path(),
                is_dir,
            });
        }
        Ok(entries)
    }

    fn remove_tree(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir(path)
    }

    fn clear_readonly(&self, path: &Path) -> io::Result<()> {
        let meta = path.symlink_metadata()?;
        if meta.file_type().is_symlink() {
            return Ok(());
        }
        let mut perms = meta.permissions();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Directories also need search permission to be emptied.
            let wanted = if meta.is_dir() { 0o700 } else { 0o200 };
            if perms.mode() & wanted == wanted {
                return Ok(());
            }
            perms.set_mode(perms.mode() | wanted);
        }

        #[cfg(not(unix))]
        {
            if !perms.readonly() {
                return Ok(());
            }
            #[allow(clippy::permissions_set_readonly_false)]
            perms.set_readonly(false);
        }

        std::fs::set_permissions(path, perms)
    }

    fn exec(&self, program: &OsStr, args: &[OsString]) -> io::Result<ExecOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(ExecOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// The OS command that force-deletes a directory tree, if this platform has one.
pub fn force_delete_command(path: &Path) -> Option<(OsString, Vec<OsString>)> {
    #[cfg(windows)]
    {
        let args = ["/C", "rmdir", "/S", "/Q"]
            .into_iter()
            .map(OsString::from)
            .chain(std::iter::once(path.as_os_str().to_os_string()))
            .collect();
        Some((OsString::from("cmd.exe"), args))
    }

    #[cfg(unix)]
    {
        let args = vec![
            OsString::from("-rf"),
            OsString::from("--"),
            path.as_os_str().to_os_string(),
        ];
        Some((OsString::from("rm"), args))
    }

    #[cfg(not(any(windows, unix)))]
    {
        let _ = path;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_dir_marks_directories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("file.txt"), b"x").unwrap();

        let mut entries = NativePlatform.list_dir(tmp.path()).unwrap();
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_dir);
        assert!(entries[1].is_dir);
    }

    #[test]
    fn is_dir_rejects_plain_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Saved"), b"not a folder").unwrap();

        assert!(NativePlatform.exists(&tmp.path().join("Saved")));
        assert!(!NativePlatform.is_dir(&tmp.path().join("Saved")));
        assert!(NativePlatform.is_dir(tmp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn clear_readonly_restores_owner_write() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("locked.bin");
        std::fs::write(&file, b"data").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o444)).unwrap();

        NativePlatform.clear_readonly(&file).unwrap();

        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o200, 0o200);
    }

    #[cfg(unix)]
    #[test]
    fn force_delete_command_is_rm() {
        let (program, args) = force_delete_command(Path::new("/proj/Saved")).unwrap();
        assert_eq!(program, "rm");
        assert_eq!(args.last().unwrap(), "/proj/Saved");
    }

    #[cfg(unix)]
    #[test]
    fn exec_captures_exit_code() {
        let out = NativePlatform
            .exec(OsStr::new("sh"), &[OsString::from("-c"), OsString::from("echo hi; exit 3")])
            .unwrap();
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout.trim(), "hi");
        assert!(!out.success());
    }
}
