//! The full update-and-release pipeline
//!
//! Per bundle: fetch → fast-forward submodules → scan → listing sync →
//! resolve references → commit & push → release. Bundles are processed
//! strictly sequentially; a fatal error in one is logged and the run
//! moves on to the next.

use crate::api::github::GitHubClient;
use crate::api::pypi;
use crate::bundle::listing::{self, ListingEntry, pypi_package_name};
use crate::bundle::release::{self, ReleaseChange, release_link};
use crate::bundle::{
  ChangeKind, ChangeRecord, Library, contributors, name_from_url, resolver, scanner, slug_from_url,
  synthesize_commit_message,
};
use crate::cache::IdentityCache;
use crate::core::config::{BotConfig, BundleConfig};
use crate::core::error::{BotError, BotResult, ConfigError};
use crate::core::vcs::SystemGit;
use chrono::Local;
use std::env;

/// Run the update command
pub fn run_update(bundle: Option<String>, dry_run: bool) -> BotResult<()> {
  let current_dir = env::current_dir()?;
  let config = BotConfig::load(&current_dir)?;
  let client = GitHubClient::new(&config.api_root)?;
  let mut cache = IdentityCache::open(&config.cache_path);

  let selected = select_bundles(&config, bundle.as_deref())?;

  let mut failures = 0;
  for bundle in selected {
    println!("📦 {}", bundle.name);
    if let Err(err) = update_one(&config, bundle, &client, &mut cache, dry_run) {
      failures += 1;
      log::error!("Failed to update and release {}: {}", bundle.name, err);
    }
  }

  if failures > 0 {
    return Err(BotError::message(format!(
      "{} bundle(s) failed to update; see the log above",
      failures
    )));
  }
  Ok(())
}

/// Pick the configured bundles to process
pub(crate) fn select_bundles<'a>(config: &'a BotConfig, name: Option<&str>) -> BotResult<Vec<&'a BundleConfig>> {
  match name {
    Some(name) => {
      let bundle = config.find_bundle(name).ok_or_else(|| {
        BotError::Config(ConfigError::BundleNotFound { name: name.to_string() })
      })?;
      Ok(vec![bundle])
    }
    None => Ok(config.bundles.iter().collect()),
  }
}

/// Update, commit, push, and release one bundle
fn update_one(
  config: &BotConfig,
  bundle: &BundleConfig,
  client: &GitHubClient,
  cache: &mut IdentityCache,
  dry_run: bool,
) -> BotResult<()> {
  let git = fetch_bundle(config, bundle, client.token())?;
  if let (Some(name), Some(email)) = (&config.git.user_name, &config.git.user_email) {
    git.set_identity(name, email)?;
  }

  git.submodule_foreach_fetch()?;
  git.submodule_checkout_latest_tags()?;

  let mut changes = scanner::scan_worktree(&git, &bundle.libraries_root, &bundle.listing_doc)?;

  if bundle.primary {
    let additions = sync_listing(&git, bundle, client.http())?;
    if !additions.is_empty() {
      changes.push(ChangeRecord {
        url: format!("https://github.com/{}/{}", bundle.slug(), bundle.listing_doc),
        old_ref: "NA".to_string(),
        new_ref: "NA".to_string(),
        summary: format!("  > Added the following libraries: {}", additions.join(", ")),
        kind: ChangeKind::ListOnly,
      });
    }
  }

  let changes = resolve_references(&git, changes)?;

  if changes.is_empty() {
    println!("   No library changes detected");
  } else if dry_run {
    println!("   🔍 Dry-run mode; would commit:");
    println!("{}", synthesize_commit_message(&changes));
  } else {
    git.add_all()?;
    git.commit(&synthesize_commit_message(&changes))?;
    git.push()?;
    println!("   Pushed {} change(s)", changes.len());
  }

  release_bundle(bundle, &git, client, cache, config.release.footer.as_deref(), dry_run)
}

/// Clone the bundle when absent, then bring it and its submodules current
pub(crate) fn fetch_bundle(config: &BotConfig, bundle: &BundleConfig, token: Option<&str>) -> BotResult<SystemGit> {
  let path = config.workdir.join(&bundle.name);

  let git = if path.is_dir() {
    SystemGit::open(&path)?
  } else {
    std::fs::create_dir_all(&config.workdir)?;
    SystemGit::clone(&bundle.clone_url(token), &path, "origin")?
  };

  git.pull()?;
  git.submodule_init_update()?;
  Ok(git)
}

/// Regenerate the listing document and report new library names
pub(crate) fn sync_listing(
  git: &SystemGit,
  bundle: &BundleConfig,
  http: &reqwest::blocking::Client,
) -> BotResult<Vec<String>> {
  let mut entries = Vec::new();
  for (path, url) in git.submodules()? {
    let library = Library::new(&path, &url);
    let pypi = pypi::package_exists(http, &pypi_package_name(&library.name));
    let docs_url = listing::docs_link(git.path(), &library);
    entries.push(ListingEntry { library, pypi, docs_url });
  }

  let doc_path = git.path().join(&bundle.listing_doc);
  let previous = std::fs::read_to_string(&doc_path).ok();
  let title = format!("{} Libraries", bundle.name.replace('_', " "));
  let sync = listing::synchronize(&title, &entries, previous.as_deref());

  std::fs::write(&doc_path, &sync.document)?;
  Ok(sync.additions)
}

/// Replace raw commit references with exact tags where they exist.
///
/// Records are replaced, never mutated; only Added/Updated records carry
/// references worth resolving.
fn resolve_references(git: &SystemGit, changes: Vec<ChangeRecord>) -> BotResult<Vec<ChangeRecord>> {
  let paths_by_url: Vec<(String, String)> = git
    .submodules()?
    .into_iter()
    .map(|(path, url)| (url.strip_suffix(".git").unwrap_or(&url).to_string(), path))
    .collect();

  let mut resolved = Vec::with_capacity(changes.len());
  for change in changes {
    match change.kind {
      ChangeKind::Updated | ChangeKind::Added => {
        let path = paths_by_url
          .iter()
          .find(|(url, _)| *url == change.url)
          .map(|(_, path)| path.clone())
          .ok_or_else(|| BotError::message(format!("No submodule found for {}", change.url)))?;
        let submodule = git.submodule(&path);

        let old_ref = if change.kind == ChangeKind::Added {
          change.old_ref.clone()
        } else {
          resolver::resolve(&submodule, &change.old_ref)?
        };
        let new_ref = resolver::resolve(&submodule, &change.new_ref)?;
        resolved.push(ChangeRecord {
          old_ref,
          new_ref,
          ..change
        });
      }
      ChangeKind::Removed | ChangeKind::ListOnly => resolved.push(change),
    }
  }

  Ok(resolved)
}

/// Compose and publish the bundle release, or report why there is nothing
/// to do. Create-release rejections (duplicate same-day tags included) are
/// reported and the run continues.
pub(crate) fn release_bundle(
  bundle: &BundleConfig,
  git: &SystemGit,
  client: &GitHubClient,
  cache: &mut IdentityCache,
  footer: Option<&str>,
  dry_run: bool,
) -> BotResult<()> {
  let slug = bundle.slug();

  let Some(last_tag) = client.latest_release_tag(&slug)? else {
    log::warn!("No published release found for {}; skipping release composition", slug);
    return Ok(());
  };
  let range = format!("{}..", last_tag);

  let diff = git.diff_submodule_short(&range)?;
  if diff.trim().is_empty() {
    println!("   Everything is already released.");
    return Ok(());
  }

  let mut master = contributors::contributors(git, &slug, &range, cache, client)?;

  let mut release_changes = Vec::new();
  for change in scanner::parse_submodule_short_diff(&diff)? {
    if change.kind == ChangeKind::Removed {
      // Detected, never surfaced into a release.
      continue;
    }

    let submodule = git.submodule(&change.path);
    let url = submodule.remote_url("origin")?;
    let url = url.strip_suffix(".git").unwrap_or(&url).to_string();
    let reference = resolver::resolve(&submodule, &change.new)?;

    let library_range = if change.kind == ChangeKind::Added {
      change.new.clone()
    } else {
      format!("{}..{}", change.old, change.new)
    };
    let library_tally = contributors::contributors(&submodule, &slug_from_url(&url), &library_range, cache, client)?;
    master.merge(&library_tally);

    release_changes.push(ReleaseChange {
      name: name_from_url(&url),
      link: release_link(&url, &reference),
      kind: change.kind,
    });
  }

  let draft = release::compose(
    Local::now().date_naive(),
    &git.head_sha()?,
    &release_changes,
    &master,
    footer,
  );

  println!("   Releasing {}", draft.tag);
  println!("{}", draft.body);

  if dry_run {
    println!("   🔍 Dry-run mode (release not created)");
    return Ok(());
  }

  if let Err(err) = client.create_release(&slug, &draft) {
    log::error!("Failed to create release for {}: {}", slug, err);
  }

  Ok(())
}
