//! Compose and publish releases for already-fetched bundles

use crate::api::github::GitHubClient;
use crate::cache::IdentityCache;
use crate::core::config::BotConfig;
use crate::core::error::{BotError, BotResult};
use crate::core::vcs::SystemGit;
use std::env;

/// Run the release command
pub fn run_release(bundle: Option<String>, dry_run: bool) -> BotResult<()> {
  let current_dir = env::current_dir()?;
  let config = BotConfig::load(&current_dir)?;
  let client = GitHubClient::new(&config.api_root)?;
  let mut cache = IdentityCache::open(&config.cache_path);

  let mut failures = 0;
  for bundle in super::update::select_bundles(&config, bundle.as_deref())? {
    println!("📦 {}", bundle.name);
    let path = config.workdir.join(&bundle.name);
    if !path.is_dir() {
      log::error!("Bundle '{}' has not been fetched; run `bundlebot update` first", bundle.name);
      failures += 1;
      continue;
    }

    let result = SystemGit::open(&path).and_then(|git| {
      super::update::release_bundle(
        bundle,
        &git,
        &client,
        &mut cache,
        config.release.footer.as_deref(),
        dry_run,
      )
    });

    if let Err(err) = result {
      failures += 1;
      log::error!("Failed to release {}: {}", bundle.name, err);
    }
  }

  if failures > 0 {
    return Err(BotError::message(format!(
      "{} bundle(s) failed to release; see the log above",
      failures
    )));
  }
  Ok(())
}
