//! SystemGit, reference resolution, and contributor log-walk behavior
//! against real repositories

use crate::helpers::TestRepo;
use anyhow::Result;
use bundlebot::bundle::contributors::{self, CommitIdentityLookup, ResolvedIdentities};
use bundlebot::bundle::resolver;
use bundlebot::cache::IdentityCache;
use bundlebot::core::error::BotResult;
use bundlebot::core::vcs::SystemGit;

/// A lookup that should never be reached in these tests
struct PanickingLookup;

impl CommitIdentityLookup for PanickingLookup {
  fn commit_identities(&self, repo_slug: &str, sha: &str) -> BotResult<ResolvedIdentities> {
    panic!("unexpected remote lookup for {}@{}", repo_slug, sha);
  }
}

#[test]
fn test_open_and_head_sha() -> Result<()> {
  let repo = TestRepo::new()?;
  let git = SystemGit::open(&repo.path)?;

  let sha = git.head_sha()?;
  assert_eq!(sha.len(), 40);
  assert!(sha.chars().all(|c| c.is_ascii_hexdigit()));
  Ok(())
}

#[test]
fn test_open_rejects_non_repository() -> Result<()> {
  let dir = tempfile::tempdir()?;
  assert!(SystemGit::open(dir.path()).is_err());
  Ok(())
}

#[test]
fn test_exact_tag_found_and_missing() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag("1.0.0")?;
  let git = SystemGit::open(&repo.path)?;
  let tagged = git.head_sha()?;

  assert_eq!(git.exact_tag(&tagged)?, Some("1.0.0".to_string()));

  repo.write_file("src.txt", "change\n")?;
  let untagged = repo.commit("Second commit")?;
  assert_eq!(git.exact_tag(&untagged)?, None);
  Ok(())
}

#[test]
fn test_resolver_is_idempotent_and_falls_back() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag("2.1.0")?;
  let git = SystemGit::open(&repo.path)?;
  let tagged = git.head_sha()?;

  let first = resolver::resolve(&git, &tagged)?;
  let second = resolver::resolve(&git, &tagged)?;
  assert_eq!(first, "2.1.0");
  assert_eq!(first, second);

  repo.write_file("src.txt", "change\n")?;
  let untagged = repo.commit("Second commit")?;
  // No reachable tag: the raw commit comes back unchanged, both times.
  assert_eq!(resolver::resolve(&git, &untagged)?, untagged);
  assert_eq!(resolver::resolve(&git, &untagged)?, untagged);
  Ok(())
}

#[test]
fn test_status_short_clean_tree() -> Result<()> {
  let repo = TestRepo::new()?;
  let git = SystemGit::open(&repo.path)?;
  assert!(git.status_short()?.trim().is_empty());
  Ok(())
}

#[test]
fn test_log_identities_format() -> Result<()> {
  let repo = TestRepo::new()?;
  let git = SystemGit::open(&repo.path)?;
  let head = git.head_sha()?;

  let commits = git.log_identities(&head)?;
  assert_eq!(commits.len(), 1);
  assert_eq!(commits[0].sha, head);
  assert_eq!(commits[0].author_email, "test@example.com");
  assert_eq!(commits[0].committer_email, "test@example.com");
  Ok(())
}

#[test]
fn test_contributors_survive_bad_range() -> Result<()> {
  let repo = TestRepo::new()?;
  let git = SystemGit::open(&repo.path)?;
  let mut cache = IdentityCache::ephemeral();

  // An unknown base ref makes the log walk fail; the aggregator reports
  // it and yields an empty tally instead of aborting the bundle.
  let tally = contributors::contributors(
    &git,
    "acme/Repo",
    "deadbeef..HEAD",
    &mut cache,
    &PanickingLookup,
  )?;
  assert!(tally.is_empty());
  Ok(())
}

#[test]
fn test_contributors_use_cache_over_remote() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file("src.txt", "change\n")?;
  repo.commit("Second commit")?;
  let git = SystemGit::open(&repo.path)?;

  let mut cache = IdentityCache::ephemeral();
  cache.set("test@example.com", "testuser");

  let head = git.head_sha()?;
  let tally = contributors::contributors(&git, "acme/Repo", &head, &mut cache, &PanickingLookup)?;
  assert_eq!(tally.get("testuser"), Some(2));
  Ok(())
}

#[test]
fn test_submodules_empty_without_gitmodules() -> Result<()> {
  let repo = TestRepo::new()?;
  let git = SystemGit::open(&repo.path)?;
  assert!(git.submodules()?.is_empty());
  Ok(())
}

#[test]
fn test_submodules_parsed_from_gitmodules() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file(
    ".gitmodules",
    "[submodule \"Acme_Widget\"]\n\
     \tpath = libraries/drivers/Acme_Widget\n\
     \turl = https://github.com/acme/Acme_Widget.git\n\
     [submodule \"Acme_Helper\"]\n\
     \tpath = libraries/helpers/Acme_Helper\n\
     \turl = https://github.com/acme/Acme_Helper.git\n",
  )?;
  let git = SystemGit::open(&repo.path)?;

  let modules = git.submodules()?;
  assert_eq!(
    modules,
    vec![
      (
        "libraries/drivers/Acme_Widget".to_string(),
        "https://github.com/acme/Acme_Widget.git".to_string()
      ),
      (
        "libraries/helpers/Acme_Helper".to_string(),
        "https://github.com/acme/Acme_Helper.git".to_string()
      ),
    ]
  );
  Ok(())
}
