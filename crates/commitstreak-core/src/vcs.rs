//! Version-control collaborator.
//!
//! [`GitCli`] drives the `git` binary in a working tree. [`RecordingVcs`]
//! keeps every call in memory and is what dry runs commit into.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::error::VcsError;

pub trait VersionControl {
    fn stage(&mut self, paths: &[&Path]) -> Result<(), VcsError>;

    /// Commit with author and committer dates both set to `date_override`.
    fn commit(&mut self, message: &str, date_override: &str) -> Result<(), VcsError>;

    fn push(&mut self) -> Result<(), VcsError>;
}

/// `git` subprocesses run inside `workdir`.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
    program: String,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            program: "git".to_string(),
        }
    }

    /// Use a different executable than `git` from `PATH`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<(), VcsError> {
        let command = format!("{} {}", self.program, args.join(" "));
        tracing::debug!(%command, "running");

        let output = Command::new(&self.program)
            .args(args)
            .envs(envs.iter().copied())
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| VcsError::Spawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(VcsError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl VersionControl for GitCli {
    fn stage(&mut self, paths: &[&Path]) -> Result<(), VcsError> {
        let mut args = vec!["add", "--"];
        let paths: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        args.extend(paths.iter().map(String::as_str));
        self.run(&args, &[])
    }

    fn commit(&mut self, message: &str, date_override: &str) -> Result<(), VcsError> {
        self.run(
            // every unit is one commit, even when the state file is unchanged
            &["commit", "--quiet", "--allow-empty", "-m", message, "--date", date_override],
            &[("GIT_COMMITTER_DATE", date_override)],
        )
    }

    fn push(&mut self) -> Result<(), VcsError> {
        self.run(&["push", "--quiet"], &[])
    }
}

/// A commit captured by [`RecordingVcs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedCommit {
    pub message: String,
    pub date: String,
    /// Paths staged since the previous commit
    pub staged: Vec<PathBuf>,
}

/// In-memory collaborator; optionally fails the n-th commit.
#[derive(Debug, Clone, Default)]
pub struct RecordingVcs {
    pending: Vec<PathBuf>,
    commits: Vec<RecordedCommit>,
    pushes: usize,
    fail_commit_at: Option<usize>,
}

impl RecordingVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the commit with this zero-based index fail.
    pub fn failing_commit_at(mut self, index: usize) -> Self {
        self.fail_commit_at = Some(index);
        self
    }

    pub fn commits(&self) -> &[RecordedCommit] {
        &self.commits
    }

    pub fn pushes(&self) -> usize {
        self.pushes
    }
}

impl VersionControl for RecordingVcs {
    fn stage(&mut self, paths: &[&Path]) -> Result<(), VcsError> {
        self.pending.extend(paths.iter().map(|p| p.to_path_buf()));
        Ok(())
    }

    fn commit(&mut self, message: &str, date_override: &str) -> Result<(), VcsError> {
        if self.fail_commit_at == Some(self.commits.len()) {
            return Err(VcsError::Failed {
                command: format!("commit -m {message}"),
                status: "exit status: 1".to_string(),
                stderr: "simulated failure".to_string(),
            });
        }
        self.commits.push(RecordedCommit {
            message: message.to_string(),
            date: date_override.to_string(),
            staged: std::mem::take(&mut self.pending),
        });
        Ok(())
    }

    fn push(&mut self) -> Result<(), VcsError> {
        self.pushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("failed to run git");
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    fn init_repo() -> TempDir {
        let dir = TempDir::new().expect("failed to create work dir");
        git(dir.path(), &["init", "--quiet"]);
        git(dir.path(), &["config", "user.email", "test@test.com"]);
        git(dir.path(), &["config", "user.name", "Test User"]);
        git(dir.path(), &["config", "commit.gpgsign", "false"]);
        dir
    }

    #[test]
    fn test_recording_vcs_groups_staged_paths_per_commit() {
        let mut vcs = RecordingVcs::new();
        vcs.stage(&[Path::new("data.json")]).unwrap();
        vcs.commit("2025-01-01T10:00:00", "2025-01-01T10:00:00").unwrap();
        vcs.commit("2025-01-01T11:00:00", "2025-01-01T11:00:00").unwrap();
        vcs.push().unwrap();

        assert_eq!(vcs.commits()[0].staged, vec![PathBuf::from("data.json")]);
        assert!(vcs.commits()[1].staged.is_empty());
        assert_eq!(vcs.pushes(), 1);
    }

    #[test]
    fn test_recording_vcs_fails_requested_commit() {
        let mut vcs = RecordingVcs::new().failing_commit_at(1);
        assert!(vcs.commit("a", "a").is_ok());
        assert!(matches!(vcs.commit("b", "b"), Err(VcsError::Failed { .. })));
        assert_eq!(vcs.commits().len(), 1);
    }

    #[test]
    fn test_git_cli_commit_uses_override_dates() {
        let repo = init_repo();
        std::fs::write(repo.path().join("data.json"), "{}").unwrap();

        let mut vcs = GitCli::new(repo.path());
        vcs.stage(&[Path::new("data.json")]).unwrap();
        vcs.commit("2025-01-03T14:05:09", "2025-01-03T14:05:09").unwrap();

        let log = git(repo.path(), &["log", "-1", "--format=%s|%ad|%cd", "--date=format:%Y-%m-%dT%H:%M:%S"]);
        assert_eq!(log.trim(), "2025-01-03T14:05:09|2025-01-03T14:05:09|2025-01-03T14:05:09");
    }

    #[test]
    fn test_git_cli_reports_failure() {
        let dir = TempDir::new().unwrap();
        // not a repository
        let mut vcs = GitCli::new(dir.path());
        let result = vcs.stage(&[Path::new("missing.json")]);
        assert!(matches!(result, Err(VcsError::Failed { .. })));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let mut vcs = GitCli::new(dir.path()).with_program("definitely-not-git-xyz");
        assert!(matches!(vcs.push(), Err(VcsError::Spawn { .. })));
    }
}
