//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway git repository
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Create an initialized repository with a test identity and one commit
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    init_git_at(&path)?;

    std::fs::write(path.join("README.md"), "# test repo\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;

    Ok(Self { _root: root, path })
  }

  /// Write a file relative to the repository root
  pub fn write_file(&self, name: &str, content: &str) -> Result<()> {
    let file_path = self.path.join(name);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
  }

  /// Commit everything and return the new HEAD SHA
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Tag the current HEAD
  pub fn tag(&self, name: &str) -> Result<()> {
    git(&self.path, &["tag", name])?;
    Ok(())
  }
}

/// Initialize a git repository at `path` with a test identity
pub fn init_git_at(path: &Path) -> Result<()> {
  std::fs::create_dir_all(path)?;
  git(path, &["init", "--initial-branch=main"])?;
  git(path, &["config", "user.name", "Test User"])?;
  git(path, &["config", "user.email", "test@example.com"])?;
  git(path, &["config", "commit.gpgsign", "false"])?;
  Ok(())
}

/// Run git in a directory, failing the test on a non-zero exit
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("git {} failed: {}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the bundlebot binary; callers assert on the returned Output
pub fn run_bundlebot(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_bundlebot");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run bundlebot")
}
