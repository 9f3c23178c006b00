//! Regenerate the library listing document for the primary bundle

use crate::core::config::BotConfig;
use crate::core::error::{BotError, BotResult};
use crate::core::vcs::SystemGit;
use std::env;

/// Run the list command
pub fn run_list() -> BotResult<()> {
  let current_dir = env::current_dir()?;
  let config = BotConfig::load(&current_dir)?;

  let Some(bundle) = config.bundles.iter().find(|b| b.primary) else {
    return Err(BotError::with_help(
      "No primary bundle configured",
      "Mark the listing-bearing bundle with primary = true in bundlebot.toml",
    ));
  };

  let path = config.workdir.join(&bundle.name);
  if !path.is_dir() {
    return Err(BotError::with_help(
      format!("Bundle '{}' has not been fetched", bundle.name),
      "Run `bundlebot update` to clone it first",
    ));
  }

  let git = SystemGit::open(&path)?;
  let http = reqwest::blocking::Client::builder()
    .user_agent(concat!("bundlebot/", env!("CARGO_PKG_VERSION")))
    .build()?;

  let additions = super::update::sync_listing(&git, bundle, &http)?;

  println!("📄 Rewrote {}", bundle.listing_doc);
  if additions.is_empty() {
    println!("   No new libraries");
  } else {
    println!("   New libraries: {}", additions.join(", "));
  }

  Ok(())
}
