//! Inspect bundle working trees without committing anything

use crate::bundle::{ChangeKind, ChangeRecord, scanner};
use crate::core::config::BotConfig;
use crate::core::error::BotResult;
use crate::core::vcs::SystemGit;
use serde::Serialize;
use std::env;

/// Status of one bundle working copy
#[derive(Debug, Serialize)]
struct BundleStatus {
  bundle: String,
  present: bool,
  changes: Vec<ChangeRecord>,
}

/// Run the status command
pub fn run_status(bundle: Option<String>, json: bool) -> BotResult<()> {
  let current_dir = env::current_dir()?;
  let config = BotConfig::load(&current_dir)?;

  let mut statuses = Vec::new();
  for bundle in super::update::select_bundles(&config, bundle.as_deref())? {
    let path = config.workdir.join(&bundle.name);
    if !path.is_dir() {
      statuses.push(BundleStatus {
        bundle: bundle.name.clone(),
        present: false,
        changes: Vec::new(),
      });
      continue;
    }

    let git = SystemGit::open(&path)?;
    let changes = scanner::scan_worktree(&git, &bundle.libraries_root, &bundle.listing_doc)?;
    statuses.push(BundleStatus {
      bundle: bundle.name.clone(),
      present: true,
      changes,
    });
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&statuses)?);
  } else {
    print_statuses(&statuses);
  }

  Ok(())
}

fn print_statuses(statuses: &[BundleStatus]) {
  for status in statuses {
    println!("📦 {}", status.bundle);
    if !status.present {
      println!("   not fetched (run `bundlebot update` first)");
      continue;
    }
    if status.changes.is_empty() {
      println!("   clean");
      continue;
    }
    for change in &status.changes {
      let kind = match change.kind {
        ChangeKind::Added => "added",
        ChangeKind::Updated => "updated",
        ChangeKind::Removed => "removed",
        ChangeKind::ListOnly => "listing",
      };
      println!("   {:<8} {} ({} -> {})", kind, change.url, change.old_ref, change.new_ref);
    }
  }
}
