//! Error types for bundlebot with contextual messages and exit codes
//!
//! One categorized error enum for the whole tool. Per-bundle failures are
//! caught in the update loop; everything else bubbles to main and maps to
//! an exit code.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for bundlebot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// One or more bundles failed to update or release
  Bundle = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for bundlebot
#[derive(Debug)]
pub enum BotError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Status-report scanning errors
  Scan(ScanError),

  /// Release-hosting API errors
  Api(ApiError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl BotError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    BotError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    BotError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      BotError::Message { message, context, help } => BotError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      other => other,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      BotError::Config(_) => ExitCode::User,
      BotError::Git(_) => ExitCode::System,
      BotError::Scan(_) => ExitCode::Bundle,
      BotError::Api(_) => ExitCode::System,
      BotError::Io(_) => ExitCode::System,
      BotError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      BotError::Config(e) => e.help_message(),
      BotError::Git(e) => e.help_message(),
      BotError::Scan(e) => e.help_message(),
      BotError::Api(_) => None,
      BotError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for BotError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BotError::Config(e) => write!(f, "{}", e),
      BotError::Git(e) => write!(f, "{}", e),
      BotError::Scan(e) => write!(f, "{}", e),
      BotError::Api(e) => write!(f, "{}", e),
      BotError::Io(e) => write!(f, "I/O error: {}", e),
      BotError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for BotError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      BotError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for BotError {
  fn from(err: io::Error) -> Self {
    BotError::Io(err)
  }
}

impl From<String> for BotError {
  fn from(msg: String) -> Self {
    BotError::message(msg)
  }
}

impl From<&str> for BotError {
  fn from(msg: &str) -> Self {
    BotError::message(msg)
  }
}

impl From<toml_edit::TomlError> for BotError {
  fn from(err: toml_edit::TomlError) -> Self {
    BotError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for BotError {
  fn from(err: toml_edit::de::Error) -> Self {
    BotError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for BotError {
  fn from(err: serde_json::Error) -> Self {
    BotError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for BotError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    BotError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<reqwest::Error> for BotError {
  fn from(err: reqwest::Error) -> Self {
    BotError::Api(ApiError::Transport {
      message: err.to_string(),
    })
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// bundlebot.toml not found
  NotFound { search_root: PathBuf },

  /// Bundle not found in configuration
  BundleNotFound { name: String },

  /// Missing required field
  MissingField { field: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Create bundlebot.toml with at least one [[bundles]] entry.".to_string())
      }
      ConfigError::BundleNotFound { name } => Some(format!(
        "Configured bundles can be listed with `bundlebot status`. Is '{}' declared under [[bundles]]?",
        name
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { search_root } => {
        write!(
          f,
          "No bundlebot configuration found.\nSearched from: {}",
          search_root.display()
        )
      }
      ConfigError::BundleNotFound { name } => {
        write!(f, "Bundle '{}' not found in configuration", name)
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed { remote: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits this clone does not. Remove the working copy and re-run.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check that GITHUB_TOKEN grants push access to the bundle.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { remote, reason } => {
        write!(f, "Push to {} failed: {}", remote, reason)
      }
    }
  }
}

/// Status-report scanning errors
#[derive(Debug)]
pub enum ScanError {
  /// A status line the scanner refuses to interpret.
  /// Unexpected structural changes risk corrupting the derived release,
  /// so the whole bundle run stops here.
  UnsupportedChange { line: String },

  /// A submodule diff that does not carry a reference range
  MalformedDiff { detail: String },
}

impl ScanError {
  fn help_message(&self) -> Option<String> {
    match self {
      ScanError::UnsupportedChange { .. } => Some(
        "Only modified submodules under the libraries root are supported. Inspect the bundle working tree by hand."
          .to_string(),
      ),
      ScanError::MalformedDiff { .. } => None,
    }
  }
}

impl fmt::Display for ScanError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ScanError::UnsupportedChange { line } => {
        write!(f, "Unsupported change in bundle status report: '{}'", line)
      }
      ScanError::MalformedDiff { detail } => {
        write!(f, "Malformed submodule diff: {}", detail)
      }
    }
  }
}

/// Release-hosting API errors
#[derive(Debug)]
pub enum ApiError {
  /// Non-2xx response; URL and body are kept for diagnosis
  Status { url: String, status: u16, body: String },

  /// Transport-level failure (DNS, TLS, timeout)
  Transport { message: String },
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Status { url, status, body } => {
        write!(f, "API request failed with HTTP {}: {}\n{}", status, url, body)
      }
      ApiError::Transport { message } => {
        write!(f, "API transport error: {}", message)
      }
    }
  }
}

/// Result type alias for bundlebot
pub type BotResult<T> = Result<T, BotError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> BotResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> BotResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<BotError>,
{
  fn context(self, ctx: impl Into<String>) -> BotResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> BotResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &BotError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exit_codes() {
    assert_eq!(BotError::message("oops").exit_code(), ExitCode::User);
    assert_eq!(
      BotError::Scan(ScanError::UnsupportedChange { line: "D foo".into() }).exit_code(),
      ExitCode::Bundle
    );
    assert_eq!(
      BotError::Api(ApiError::Transport { message: "dns".into() }).exit_code(),
      ExitCode::System
    );
  }

  #[test]
  fn test_context_chains() {
    let err = BotError::message("inner").context("outer");
    assert_eq!(err.to_string(), "inner\nouter");
  }

  #[test]
  fn test_api_status_display_keeps_url_and_body() {
    let err = ApiError::Status {
      url: "https://api.example/repos/o/r/releases".into(),
      status: 422,
      body: "{\"message\":\"already_exists\"}".into(),
    };
    let text = err.to_string();
    assert!(text.contains("422"));
    assert!(text.contains("releases"));
    assert!(text.contains("already_exists"));
  }
}
