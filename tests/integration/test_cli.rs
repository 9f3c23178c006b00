//! CLI-level behavior: config discovery, status reporting, exit codes

use crate::helpers::{init_git_at, run_bundlebot};
use anyhow::Result;
use tempfile::TempDir;

const CONFIG: &str = r#"
workdir = ".bundles"
cache_path = ".bundles/identity_cache.json"

[[bundles]]
name = "Test_Bundle"
owner = "acme"
primary = true
"#;

/// A working directory with a config and one fetched (empty) bundle
fn workspace_with_bundle() -> Result<TempDir> {
  let dir = TempDir::new()?;
  std::fs::write(dir.path().join("bundlebot.toml"), CONFIG)?;

  let bundle_path = dir.path().join(".bundles").join("Test_Bundle");
  init_git_at(&bundle_path)?;
  std::fs::write(bundle_path.join("README.md"), "# bundle\n")?;
  crate::helpers::git(&bundle_path, &["add", "."])?;
  crate::helpers::git(&bundle_path, &["commit", "-m", "Initial commit"])?;

  Ok(dir)
}

#[test]
fn test_missing_config_is_a_user_error() -> Result<()> {
  let dir = TempDir::new()?;
  let output = run_bundlebot(dir.path(), &["status"])?;

  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("No bundlebot configuration found"));
  Ok(())
}

#[test]
fn test_unknown_bundle_is_rejected() -> Result<()> {
  let workspace = workspace_with_bundle()?;
  let output = run_bundlebot(workspace.path(), &["status", "--bundle", "Nope"])?;

  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("not found in configuration"));
  Ok(())
}

#[test]
fn test_status_reports_clean_bundle() -> Result<()> {
  let workspace = workspace_with_bundle()?;
  let output = run_bundlebot(workspace.path(), &["status"])?;

  assert!(output.status.success());
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Test_Bundle"));
  assert!(stdout.contains("clean"));
  Ok(())
}

#[test]
fn test_status_reports_unfetched_bundle() -> Result<()> {
  let dir = TempDir::new()?;
  std::fs::write(dir.path().join("bundlebot.toml"), CONFIG)?;

  let output = run_bundlebot(dir.path(), &["status"])?;
  assert!(output.status.success());
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("not fetched"));
  Ok(())
}

#[test]
fn test_status_json_output() -> Result<()> {
  let workspace = workspace_with_bundle()?;
  let output = run_bundlebot(workspace.path(), &["status", "--json"])?;

  assert!(output.status.success());
  let stdout = String::from_utf8_lossy(&output.stdout);
  let json: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(json[0]["bundle"], "Test_Bundle");
  assert_eq!(json[0]["present"], true);
  assert_eq!(json[0]["changes"].as_array().map(|a| a.len()), Some(0));
  Ok(())
}
