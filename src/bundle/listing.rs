//! Library List Synchronizer: the derived listing document
//!
//! Rendering is pure: PyPI and docs lookups happen upstream and arrive
//! here as plain data, so regenerating the document from an unchanged
//! library set is byte-identical. "New" detection is a content diff
//! against the previously persisted document, which also catches
//! libraries added without moving any tracked reference.

use crate::bundle::{Category, Library};
use regex::Regex;
use std::path::Path;

/// One library plus the link lookups already performed for it
#[derive(Debug, Clone)]
pub struct ListingEntry {
  pub library: Library,
  /// The package index lookup succeeded
  pub pypi: bool,
  /// Extracted documentation URL, if any
  pub docs_url: Option<String>,
}

/// A regenerated listing document and the names new to it
#[derive(Debug, Clone)]
pub struct ListingSync {
  pub document: String,
  pub additions: Vec<String>,
}

/// Package index name for a library: underscores dashed, lowercased
pub fn pypi_package_name(library_name: &str) -> String {
  library_name.replace('_', "-").to_lowercase()
}

/// Render one listing line
pub fn render_line(entry: &ListingEntry) -> String {
  let mut line = format!("* [{}]({})", entry.library.display_name(), entry.library.url);
  if entry.pypi {
    line.push_str(&format!(
      " ([PyPI](https://pypi.org/project/{}))",
      pypi_package_name(&entry.library.name)
    ));
  }
  if let Some(docs) = &entry.docs_url {
    line.push_str(&format!(" ([Docs]({}))", docs));
  }
  line
}

/// Recompute the listing document and report which library names are new.
///
/// Entries are enumerated in path order (stable), while each rendered
/// section is sorted alphabetically by line text, deliberately two
/// different sort keys: enumeration must be stable, file output must be
/// human-browsable.
pub fn synchronize(title: &str, entries: &[ListingEntry], previous: Option<&str>) -> ListingSync {
  let mut ordered: Vec<&ListingEntry> = entries.iter().collect();
  ordered.sort_by(|a, b| a.library.path.cmp(&b.library.path));

  let previous_lines: Vec<&str> = previous.map(|text| text.lines().collect()).unwrap_or_default();

  let mut drivers = Vec::new();
  let mut helpers = Vec::new();
  let mut additions = Vec::new();

  for entry in &ordered {
    let line = render_line(entry);
    if !previous_lines.contains(&line.as_str()) {
      additions.push(entry.library.name.clone());
    }
    match entry.library.category {
      Category::Drivers => drivers.push(line),
      Category::Helpers => helpers.push(line),
      Category::Other => {}
    }
  }

  drivers.sort();
  helpers.sort();

  let header = [
    format!("# {}", title),
    "Here is a listing of current libraries in this bundle.".to_string(),
    format!("There are {} libraries available.\n", ordered.len()),
    "## Drivers:\n".to_string(),
  ];

  let mut document = header.join("\n");
  for line in &drivers {
    document.push_str(line);
    document.push('\n');
  }
  document.push_str("\n## Helpers:\n");
  for line in &helpers {
    document.push_str(line);
    document.push('\n');
  }

  ListingSync { document, additions }
}

/// Extract a documentation URL from a library's README.rst: the
/// `:target:` of a readthedocs badge. Missing file or badge means no link.
pub fn docs_link(bundle_path: &Path, library: &Library) -> Option<String> {
  let readme = bundle_path.join(&library.path).join("README.rst");
  let content = std::fs::read_to_string(readme).ok()?;

  let target = Regex::new(r":target:\s*(\S+)").ok()?;
  let mut saw_badge = false;
  for line in content.lines() {
    if line.contains("readthedocs.org/projects") {
      saw_badge = true;
      continue;
    }
    if saw_badge {
      if let Some(captures) = target.captures(line) {
        return Some(captures[1].to_string());
      }
    }
  }
  None
}
