//! Contributor Aggregator: commit attribution with cross-run memoization
//!
//! Emails resolve to account handles through the identity cache first;
//! only unresolved identities trigger a remote commit-detail lookup. The
//! aggregator is correct with an empty or unavailable cache; the cache
//! is purely an optimization.

use crate::cache::IdentityCache;
use crate::core::error::BotResult;
use crate::core::vcs::{CommitIdentity, SystemGit};

/// The platform's anonymous/squash sentinel. Commits carrying it as the
/// committer email get no committer credit.
pub const NOREPLY_EMAIL: &str = "noreply@github.com";

/// Handles resolved from one remote commit-detail lookup
#[derive(Debug, Clone, Default)]
pub struct ResolvedIdentities {
  pub author: Option<String>,
  pub committer: Option<String>,
}

/// Remote commit-detail collaborator (the release-hosting API)
pub trait CommitIdentityLookup {
  fn commit_identities(&self, repo_slug: &str, sha: &str) -> BotResult<ResolvedIdentities>;
}

/// Insertion-ordered handle → commit-weight mapping.
///
/// Merging is "insert at zero if absent, then add": associative and
/// commutative, so the processing order of libraries never changes the
/// final tally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributorTally {
  entries: Vec<(String, u64)>,
}

impl ContributorTally {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add weight for a handle, inserting it at zero first if unseen
  pub fn credit(&mut self, handle: &str, weight: u64) {
    match self.entries.iter_mut().find(|(name, _)| name == handle) {
      Some((_, count)) => *count += weight,
      None => self.entries.push((handle.to_string(), weight)),
    }
  }

  /// Fold another tally into this one
  pub fn merge(&mut self, other: &ContributorTally) {
    for (handle, weight) in &other.entries {
      self.credit(handle, *weight);
    }
  }

  pub fn get(&self, handle: &str) -> Option<u64> {
    self.entries.iter().find(|(name, _)| name == handle).map(|(_, count)| *count)
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Handles by descending weight; ties keep insertion order (stable sort)
  pub fn ranked(&self) -> Vec<(&str, u64)> {
    let mut ranked: Vec<(&str, u64)> = self
      .entries
      .iter()
      .map(|(handle, count)| (handle.as_str(), *count))
      .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
  }
}

/// Tally contributors for `repo_slug` over `commit_range`.
///
/// A failed log walk (unknown range in a shallow or rewritten clone) is
/// reported and yields an empty tally rather than aborting the bundle.
pub fn contributors(
  repo: &SystemGit,
  repo_slug: &str,
  commit_range: &str,
  cache: &mut IdentityCache,
  lookup: &dyn CommitIdentityLookup,
) -> BotResult<ContributorTally> {
  let commits = match repo.log_identities(commit_range) {
    Ok(commits) => commits,
    Err(err) => {
      log::warn!("Skipping contributors for {}: {}", repo_slug, err);
      return Ok(ContributorTally::new());
    }
  };

  tally_commits(repo_slug, &commits, cache, lookup)
}

/// Attribute a list of commits, consulting the cache before the remote.
pub fn tally_commits(
  repo_slug: &str,
  commits: &[CommitIdentity],
  cache: &mut IdentityCache,
  lookup: &dyn CommitIdentityLookup,
) -> BotResult<ContributorTally> {
  let mut tally = ContributorTally::new();

  for commit in commits {
    let committer_excluded = commit.committer_email == NOREPLY_EMAIL;

    let mut author = cache.get(&commit.author_email);
    let mut committer = if committer_excluded {
      None
    } else {
      cache.get(&commit.committer_email)
    };

    // One remote lookup per commit at most; cache hits never go remote.
    if author.is_none() || (!committer_excluded && committer.is_none()) {
      let resolved = lookup.commit_identities(repo_slug, &commit.sha)?;

      match resolved.author {
        Some(handle) => {
          cache.set(&commit.author_email, &handle);
          if author.is_none() {
            author = Some(handle);
          }
        }
        None => {
          if author.is_none() {
            log::warn!("No author identity for {}@{}; skipping author credit", repo_slug, commit.sha);
          }
        }
      }

      match resolved.committer {
        Some(handle) => {
          cache.set(&commit.committer_email, &handle);
          if committer.is_none() && !committer_excluded {
            committer = Some(handle);
          }
        }
        None => {
          if committer.is_none() && !committer_excluded {
            log::warn!(
              "No committer identity for {}@{}; skipping committer credit",
              repo_slug,
              commit.sha
            );
          }
        }
      }
    }

    if let Some(author) = &author {
      tally.credit(author, 1);
    }
    if let Some(committer) = &committer {
      if Some(committer) != author.as_ref() {
        tally.credit(committer, 1);
      }
    }
  }

  Ok(tally)
}
