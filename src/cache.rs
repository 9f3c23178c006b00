//! Persistent identity cache: email → account handle, no expiry
//!
//! A JSON file shared across runs and potentially across concurrent
//! invocations. Entries are immutable once written (an email maps to at
//! most one handle), so concurrent writers racing on the same key are
//! last-write-wins safe. The cache is strictly an optimization: any
//! problem reading or writing it degrades to remote lookups, never an
//! error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

const KEY_PREFIX: &str = "github_username:";

/// File-backed email → handle store
#[derive(Debug)]
pub struct IdentityCache {
  path: Option<PathBuf>,
  entries: HashMap<String, String>,
}

impl IdentityCache {
  /// Open the cache at `path`. A missing file is an empty cache; an
  /// unreadable or corrupt file is logged and treated as empty.
  pub fn open(path: &Path) -> IdentityCache {
    let entries = match std::fs::read_to_string(path) {
      Ok(content) => match serde_json::from_str::<HashMap<String, String>>(&content) {
        Ok(entries) => entries,
        Err(err) => {
          log::warn!("Identity cache at {} is corrupt ({}); starting empty", path.display(), err);
          HashMap::new()
        }
      },
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
      Err(err) => {
        log::warn!("Identity cache at {} is unreadable ({}); starting empty", path.display(), err);
        HashMap::new()
      }
    };

    IdentityCache {
      path: Some(path.to_path_buf()),
      entries,
    }
  }

  /// An in-memory cache that never touches disk
  pub fn ephemeral() -> IdentityCache {
    IdentityCache {
      path: None,
      entries: HashMap::new(),
    }
  }

  /// Look up the handle for an email
  pub fn get(&self, email: &str) -> Option<String> {
    self.entries.get(&Self::key(email)).cloned()
  }

  /// Record a resolved handle, write-through best-effort
  pub fn set(&mut self, email: &str, handle: &str) {
    self.entries.insert(Self::key(email), handle.to_string());
    self.persist();
  }

  /// Number of cached identities
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  fn key(email: &str) -> String {
    format!("{}{}", KEY_PREFIX, email)
  }

  fn persist(&self) {
    let Some(path) = &self.path else {
      return;
    };

    if let Some(parent) = path.parent() {
      if let Err(err) = std::fs::create_dir_all(parent) {
        log::warn!("Cannot create cache directory {}: {}", parent.display(), err);
        return;
      }
    }

    match serde_json::to_string_pretty(&self.entries) {
      Ok(json) => {
        if let Err(err) = std::fs::write(path, json) {
          log::warn!("Cannot persist identity cache to {}: {}", path.display(), err);
        }
      }
      Err(err) => log::warn!("Cannot serialize identity cache: {}", err),
    }
  }
}
