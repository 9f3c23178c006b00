//! Reference Resolver: commit identifier → exact tag when one exists

use crate::core::error::BotResult;
use crate::core::vcs::SystemGit;

/// Resolve a commit to the exact tag pointing at it, falling back to the
/// raw identifier when no tag matches.
///
/// Only the documented "no such tag" outcome falls back; any other
/// failure from the tag query propagates, so real errors are never
/// masked as "untagged". Resolution is idempotent for the lifetime of
/// the tag.
pub fn resolve(repo: &SystemGit, commit: &str) -> BotResult<String> {
  Ok(repo.exact_tag(commit)?.unwrap_or_else(|| commit.to_string()))
}
