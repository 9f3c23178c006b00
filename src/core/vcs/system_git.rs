//! System git backend - zero git crate dependencies
//!
//! All version-control work goes through the system `git` binary with an
//! isolated environment and an explicit `-C <path>` working directory.
//! There is no process-wide chdir anywhere: every repository (the bundle
//! and each submodule) gets its own `SystemGit` value.

use crate::core::error::{BotError, BotResult, GitError, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository, verifying it exists
  ///
  /// This performs ONE subprocess call to validate the path.
  pub fn open(path: &Path) -> BotResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(BotError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(BotError::message(format!("Failed to open git repository: {}", stderr)));
    }

    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// A repository nested inside this one (a checked-out submodule).
  ///
  /// No validation round-trip: the caller guarantees `rel_path` was
  /// populated by `submodule update`.
  pub fn submodule(&self, rel_path: &str) -> SystemGit {
    SystemGit {
      repo_path: self.repo_path.join(rel_path),
    }
  }

  /// The working directory this handle operates on
  pub fn path(&self) -> &Path {
    &self.repo_path
  }

  /// Get HEAD commit SHA
  pub fn head_sha(&self) -> BotResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "HEAD"])
      .output()
      .context("Failed to get HEAD commit")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BotError::Git(GitError::CommandFailed {
        command: "git rev-parse HEAD".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Run a git subcommand, discarding stdout
  pub(crate) fn run(&self, args: &[&str]) -> BotResult<()> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.first().unwrap_or(&"")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BotError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Run a git subcommand and capture stdout as text
  pub(crate) fn run_captured(&self, args: &[&str]) -> BotResult<String> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.first().unwrap_or(&"")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BotError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables, whitelisting only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Self::base_cmd();
    cmd.arg("-C").arg(&self.repo_path);
    cmd
  }

  /// A git command not yet bound to a repository (used for clone)
  pub(crate) fn base_cmd() -> Command {
    let mut cmd = Command::new("git");

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }
}
