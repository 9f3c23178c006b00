//! Listing regeneration through the binary: idempotence and reporting

use crate::helpers::{git, init_git_at, run_bundlebot};
use anyhow::Result;
use tempfile::TempDir;

const CONFIG: &str = r#"
workdir = ".bundles"

[[bundles]]
name = "Test_Bundle"
owner = "acme"
primary = true
"#;

fn workspace() -> Result<TempDir> {
  let dir = TempDir::new()?;
  std::fs::write(dir.path().join("bundlebot.toml"), CONFIG)?;

  let bundle_path = dir.path().join(".bundles").join("Test_Bundle");
  init_git_at(&bundle_path)?;
  std::fs::write(bundle_path.join("README.md"), "# bundle\n")?;
  git(&bundle_path, &["add", "."])?;
  git(&bundle_path, &["commit", "-m", "Initial commit"])?;

  Ok(dir)
}

#[test]
fn test_list_regeneration_is_idempotent() -> Result<()> {
  let workspace = workspace()?;
  let doc_path = workspace.path().join(".bundles/Test_Bundle/library_list.md");

  let first = run_bundlebot(workspace.path(), &["list"])?;
  assert!(first.status.success());
  let first_bytes = std::fs::read(&doc_path)?;

  let second = run_bundlebot(workspace.path(), &["list"])?;
  assert!(second.status.success());
  let second_bytes = std::fs::read(&doc_path)?;

  assert_eq!(first_bytes, second_bytes);
  let stdout = String::from_utf8_lossy(&second.stdout);
  assert!(stdout.contains("No new libraries"));
  Ok(())
}

#[test]
fn test_list_document_structure() -> Result<()> {
  let workspace = workspace()?;
  let output = run_bundlebot(workspace.path(), &["list"])?;
  assert!(output.status.success());

  let doc = std::fs::read_to_string(workspace.path().join(".bundles/Test_Bundle/library_list.md"))?;
  assert!(doc.starts_with("# Test Bundle Libraries"));
  assert!(doc.contains("There are 0 libraries available."));
  assert!(doc.contains("## Drivers:"));
  assert!(doc.contains("## Helpers:"));
  Ok(())
}

#[test]
fn test_list_without_fetched_bundle_fails() -> Result<()> {
  let dir = TempDir::new()?;
  std::fs::write(dir.path().join("bundlebot.toml"), CONFIG)?;

  let output = run_bundlebot(dir.path(), &["list"])?;
  assert!(!output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("has not been fetched"));
  Ok(())
}
