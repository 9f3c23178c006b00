//! Bundle domain model and the update/release pipeline stages
//!
//! - **scanner**: typed change records out of raw git status/diff text
//! - **listing**: the derived library listing document
//! - **resolver**: commit → exact tag resolution
//! - **contributors**: commit attribution with cross-run memoization
//! - **release**: release draft composition

pub mod contributors;
pub mod listing;
pub mod release;
pub mod resolver;
pub mod scanner;

use serde::Serialize;
use std::path::PathBuf;

/// Category a library belongs to, derived from its path inside the bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
  Drivers,
  Helpers,
  /// Enumerated and counted, but rendered in neither listing section
  Other,
}

impl Category {
  fn from_path(path: &str) -> Self {
    if path.contains("drivers") {
      Category::Drivers
    } else if path.contains("helpers") {
      Category::Helpers
    } else {
      Category::Other
    }
  }
}

/// One member library, enumerated fresh each run from .gitmodules
#[derive(Debug, Clone)]
pub struct Library {
  /// Containing directory inside the bundle, e.g. libraries/drivers/foo
  pub path: PathBuf,
  /// Remote URL as recorded in .gitmodules
  pub url: String,
  /// Derived name: URL path segment before `.git`
  pub name: String,
  pub category: Category,
}

impl Library {
  pub fn new(path: &str, url: &str) -> Self {
    Self {
      path: PathBuf::from(path),
      url: url.to_string(),
      name: name_from_url(url),
      category: Category::from_path(path),
    }
  }

  /// Name with underscores spaced out, for human-facing listings
  pub fn display_name(&self) -> String {
    self.name.replace('_', " ")
  }
}

/// What happened to a library since the comparison point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
  Added,
  Updated,
  /// Detected but never surfaced into a release
  Removed,
  /// The listing document gained entries without any tracked reference moving
  ListOnly,
}

/// One detected change, immutable once created
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecord {
  /// Library remote URL, `.git` suffix stripped
  pub url: String,
  pub old_ref: String,
  pub new_ref: String,
  /// Free-text diff summary carried into the bundle commit message
  pub summary: String,
  pub kind: ChangeKind,
}

/// Derive a library name from its remote URL: the path segment before `.git`
pub fn name_from_url(url: &str) -> String {
  let trimmed = url.strip_suffix(".git").unwrap_or(url);
  trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

/// `owner/repo` slug from a remote URL, `.git` suffix stripped
pub fn slug_from_url(url: &str) -> String {
  let trimmed = url.strip_suffix(".git").unwrap_or(url);
  let mut segments = trimmed.rsplit('/');
  let repo = segments.next().unwrap_or_default();
  let owner = segments.next().unwrap_or_default();
  format!("{}/{}", owner, repo)
}

/// Compose the multi-line bundle commit message from this run's changes.
///
/// The first line stamps the tool and its version; each record becomes one
/// paragraph with bare `#NNN` issue references rewritten to `owner/repo#NNN`
/// so they link across repositories.
pub fn synthesize_commit_message(changes: &[ChangeRecord]) -> String {
  let mut paragraphs = vec![format!(
    "Automated update by bundlebot {}",
    env!("CARGO_PKG_VERSION")
  )];

  for change in changes {
    let slug = slug_from_url(&change.url);
    let summary = change.summary.replace('#', &format!("{}#", slug));
    paragraphs.push(format!(
      "Updating {} to {} from {}:\n{}",
      change.url, change.new_ref, change.old_ref, summary
    ));
  }

  paragraphs.join("\n\n")
}
