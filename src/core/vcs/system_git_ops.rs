//! Bundle-facing operations for SystemGit (submodules, diffs, releases)
//!
//! The exact output formats captured here are part of the parsing contract
//! with `bundle::scanner`; a change to any `--pretty`/`--submodule` flag
//! must be mirrored there.

use super::CommitIdentity;
use super::system_git::SystemGit;
use crate::core::error::{BotError, BotResult, GitError, ResultExt};
use std::path::Path;

impl SystemGit {
  /// Clone `url` into `target`, naming the remote `origin_name`
  pub fn clone(url: &str, target: &Path, origin_name: &str) -> BotResult<SystemGit> {
    let output = Self::base_cmd()
      .args(["clone", "-o", origin_name, url])
      .arg(target)
      .output()
      .context("Failed to execute git clone")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BotError::Git(GitError::CommandFailed {
        command: "git clone".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(SystemGit {
      repo_path: target.to_path_buf(),
    })
  }

  /// Fast-forward the checkout from its remote
  pub fn pull(&self) -> BotResult<()> {
    self.run(&["pull"])
  }

  /// Register and check out all submodules
  pub fn submodule_init_update(&self) -> BotResult<()> {
    self.run(&["submodule", "init"])?;
    self.run(&["submodule", "update"])
  }

  /// Fetch the remote of every submodule
  pub fn submodule_foreach_fetch(&self) -> BotResult<()> {
    self.run(&["submodule", "foreach", "git", "fetch"])
  }

  /// Check out the latest non-prerelease tag in every submodule.
  ///
  /// Regular release tags are 'x.x.x'. Alpha/beta tags contain a '-',
  /// such as '3.0.0-beta.5', and are excluded. --exclude must come
  /// before --tags. Submodules with no tags are left where they are.
  pub fn submodule_checkout_latest_tags(&self) -> BotResult<()> {
    self.run(&[
      "submodule",
      "foreach",
      "git checkout -q `git rev-list --exclude='*-*' --tags --max-count=1`",
    ])
  }

  /// Short-form status report, the Status Scanner's input
  pub fn status_short(&self) -> BotResult<String> {
    self.run_captured(&["status", "--short"])
  }

  /// Submodule log diff for one path (reference range + commit summary)
  pub fn diff_submodule_log(&self, path: &str) -> BotResult<String> {
    self.run_captured(&["diff", "--submodule=log", path])
  }

  /// Submodule short diff across a commit range (release-time scan input)
  pub fn diff_submodule_short(&self, range: &str) -> BotResult<String> {
    self.run_captured(&["diff", "--submodule=short", range])
  }

  /// The exact tag pointing at `commit`, if any.
  ///
  /// Only the documented not-found case maps to Ok(None); every other
  /// failure propagates so real errors are never masked as "untagged".
  pub fn exact_tag(&self, commit: &str) -> BotResult<Option<String>> {
    let output = self
      .git_cmd()
      .args(["describe", "--tags", "--exact-match", commit])
      .output()
      .context("Failed to execute git describe")?;

    if output.status.success() {
      return Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()));
    }

    let stderr = String::from_utf8_lossy(&output.stderr).to_lowercase();
    if stderr.contains("no tag exactly matches")
      || stderr.contains("no names found")
      || stderr.contains("cannot describe")
    {
      return Ok(None);
    }

    Err(BotError::Git(GitError::CommandFailed {
      command: format!("git describe --tags --exact-match {}", commit),
      stderr: stderr.to_string(),
    }))
  }

  /// Commit identities over a range, oldest format `%H,%ae,%ce` per line
  pub fn log_identities(&self, range: &str) -> BotResult<Vec<CommitIdentity>> {
    let stdout = self.run_captured(&["log", "--pretty=tformat:%H,%ae,%ce", range])?;

    let mut commits = Vec::new();
    for line in stdout.lines() {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      let mut fields = line.splitn(3, ',');
      let sha = fields.next().unwrap_or_default();
      let author_email = fields.next().unwrap_or_default();
      let committer_email = fields.next().unwrap_or_default();
      commits.push(CommitIdentity {
        sha: sha.to_string(),
        author_email: author_email.to_string(),
        committer_email: committer_email.to_string(),
      });
    }

    Ok(commits)
  }

  /// URL of a named remote
  pub fn remote_url(&self, name: &str) -> BotResult<String> {
    Ok(self.run_captured(&["remote", "get-url", name])?.trim().to_string())
  }

  /// Enumerate submodules from .gitmodules as (path, url) pairs, in file order
  pub fn submodules(&self) -> BotResult<Vec<(String, String)>> {
    if !self.repo_path.join(".gitmodules").exists() {
      return Ok(Vec::new());
    }

    let stdout = self.run_captured(&[
      "config",
      "-f",
      ".gitmodules",
      "--get-regexp",
      r"^submodule\..*\.(path|url)$",
    ])?;

    // Lines look like "submodule.<name>.path libraries/drivers/foo".
    // path and url always come in adjacent pairs per submodule entry.
    let mut order: Vec<String> = Vec::new();
    let mut paths: Vec<(String, String)> = Vec::new();
    let mut urls: Vec<(String, String)> = Vec::new();

    for line in stdout.lines() {
      let Some((key, value)) = line.split_once(' ') else {
        continue;
      };
      let Some(rest) = key.strip_prefix("submodule.") else {
        continue;
      };
      if let Some(name) = rest.strip_suffix(".path") {
        if !order.iter().any(|n| n == name) {
          order.push(name.to_string());
        }
        paths.push((name.to_string(), value.to_string()));
      } else if let Some(name) = rest.strip_suffix(".url") {
        if !order.iter().any(|n| n == name) {
          order.push(name.to_string());
        }
        urls.push((name.to_string(), value.to_string()));
      }
    }

    let mut modules = Vec::new();
    for name in &order {
      let path = paths.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone());
      let url = urls.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone());
      if let (Some(path), Some(url)) = (path, url) {
        modules.push((path, url));
      } else {
        log::warn!("Submodule '{}' is missing a path or url in .gitmodules; skipping", name);
      }
    }

    Ok(modules)
  }

  /// Stage every change in the working tree
  pub fn add_all(&self) -> BotResult<()> {
    self.run(&["add", "."])
  }

  /// Commit staged changes with a (possibly multi-line) message
  pub fn commit(&self, message: &str) -> BotResult<()> {
    self.run(&["commit", "-m", message])
  }

  /// Push the current branch to its upstream
  pub fn push(&self) -> BotResult<()> {
    let output = self.git_cmd().args(["push"]).output().context("Failed to push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BotError::Git(GitError::PushFailed {
        remote: self.repo_path.display().to_string(),
        reason: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Set the repo-local commit identity (CI clones have none)
  pub fn set_identity(&self, user_name: &str, user_email: &str) -> BotResult<()> {
    self.run(&["config", "user.name", user_name])?;
    self.run(&["config", "user.email", user_email])
  }
}
