//! bundlebot configuration (bundlebot.toml) parsing and validation

use crate::core::error::{BotError, BotResult, ConfigError, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for bundlebot
/// Searched in order: bundlebot.toml, .bundlebot.toml, .config/bundlebot.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
  /// Directory bundles are cloned into (created on demand)
  #[serde(default = "default_workdir")]
  pub workdir: PathBuf,

  /// Identity cache file shared across runs
  #[serde(default = "default_cache_path")]
  pub cache_path: PathBuf,

  /// Release-hosting API root
  #[serde(default = "default_api_root")]
  pub api_root: String,

  /// Commit identity applied to each bundle clone (CI runs)
  #[serde(default)]
  pub git: GitIdentity,

  #[serde(default)]
  pub bundles: Vec<BundleConfig>,

  #[serde(default)]
  pub release: ReleaseSettings,
}

fn default_workdir() -> PathBuf {
  PathBuf::from(".bundles")
}

fn default_cache_path() -> PathBuf {
  PathBuf::from(".bundles/identity_cache.json")
}

fn default_api_root() -> String {
  "https://api.github.com".to_string()
}

/// Commit identity for automated commits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitIdentity {
  #[serde(default)]
  pub user_name: Option<String>,

  #[serde(default)]
  pub user_email: Option<String>,
}

/// One umbrella repository aggregating library submodules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
  /// Repository name, e.g. "Acme_Sensor_Bundle"
  pub name: String,

  /// Owning account on the release host
  pub owner: String,

  /// The primary bundle maintains the derived library listing document
  #[serde(default)]
  pub primary: bool,

  /// File name of the listing document inside the bundle
  #[serde(default = "default_listing_doc")]
  pub listing_doc: String,

  /// Path prefix all library submodules live under
  #[serde(default = "default_libraries_root")]
  pub libraries_root: String,
}

fn default_listing_doc() -> String {
  "library_list.md".to_string()
}

fn default_libraries_root() -> String {
  "libraries".to_string()
}

/// Release-note settings shared by all bundles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseSettings {
  /// Free-text block appended to every release body after a separator
  #[serde(default)]
  pub footer: Option<String>,
}

impl BundleConfig {
  /// owner/name slug used in API paths
  pub fn slug(&self) -> String {
    format!("{}/{}", self.owner, self.name)
  }

  /// HTTPS clone URL; the token is injected for pushable CI clones
  pub fn clone_url(&self, token: Option<&str>) -> String {
    match token {
      Some(token) => format!("https://{}@github.com/{}/{}.git", token, self.owner, self.name),
      None => format!("https://github.com/{}/{}.git", self.owner, self.name),
    }
  }
}

impl BotConfig {
  /// Find config file in search order
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("bundlebot.toml"),
      path.join(".bundlebot.toml"),
      path.join(".config").join("bundlebot.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from bundlebot.toml (searches multiple locations)
  pub fn load(path: &Path) -> BotResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      BotError::Config(ConfigError::NotFound {
        search_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: BotConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.validate()?;

    Ok(config)
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Find a configured bundle by name
  pub fn find_bundle(&self, name: &str) -> Option<&BundleConfig> {
    self.bundles.iter().find(|b| b.name == name)
  }

  fn validate(&self) -> BotResult<()> {
    if self.bundles.is_empty() {
      return Err(BotError::with_help(
        "No bundles configured",
        "Add at least one [[bundles]] entry to bundlebot.toml",
      ));
    }

    for bundle in &self.bundles {
      if bundle.owner.is_empty() {
        return Err(BotError::Config(ConfigError::MissingField {
          field: format!("owner for bundle '{}'", bundle.name),
        }));
      }
    }

    if self.bundles.iter().filter(|b| b.primary).count() > 1 {
      return Err(BotError::with_help(
        "More than one bundle is marked primary",
        "Only the primary bundle maintains the library listing document",
      ));
    }

    Ok(())
  }
}
