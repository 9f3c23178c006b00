//! Release Composer: deterministic release payload out of change records
//! and contributor tallies
//!
//! The composer either produces a complete draft or nothing; no partial
//! release is ever published. The no-op decision (empty diff since the
//! last published tag) is made by the caller before composition.

use crate::bundle::ChangeKind;
use crate::bundle::contributors::ContributorTally;
use chrono::NaiveDate;
use serde::Serialize;

/// The complete, ready-to-publish payload describing one dated release.
/// Serializes directly into the create-release API body.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseDraft {
  #[serde(rename = "tag_name")]
  pub tag: String,
  #[serde(rename = "target_commitish")]
  pub target: String,
  #[serde(rename = "name")]
  pub title: String,
  pub body: String,
  pub draft: bool,
  pub prerelease: bool,
}

/// A library change enriched for release rendering
#[derive(Debug, Clone)]
pub struct ReleaseChange {
  pub name: String,
  pub link: String,
  pub kind: ChangeKind,
}

/// Release-page link for a library at a resolved reference
pub fn release_link(library_url: &str, reference: &str) -> String {
  format!("{}/releases/{}", library_url, reference)
}

/// Compose the release draft for one bundle.
///
/// `Removed` and `ListOnly` changes are never surfaced. Contributors are
/// mentioned by descending tally, ties in insertion order.
pub fn compose(
  date: NaiveDate,
  head_sha: &str,
  changes: &[ReleaseChange],
  tally: &ContributorTally,
  footer: Option<&str>,
) -> ReleaseDraft {
  let added: Vec<String> = changes
    .iter()
    .filter(|c| c.kind == ChangeKind::Added)
    .map(|c| format!("[{}]({})", c.name, c.link))
    .collect();
  let updated: Vec<String> = changes
    .iter()
    .filter(|c| c.kind == ChangeKind::Updated)
    .map(|c| format!("[{}]({})", c.name, c.link))
    .collect();

  let mut sections = Vec::new();
  if !added.is_empty() {
    sections.push(format!("New libraries: {}", added.join(", ")));
  }
  if !updated.is_empty() {
    sections.push(format!("Updated libraries: {}", updated.join(", ")));
  }
  sections.push(String::new());

  let mentions: Vec<String> = tally.ranked().iter().map(|(handle, _)| format!("@{}", handle)).collect();
  sections.push(format!(
    "As always, thank you to all of our contributors: {}",
    mentions.join(", ")
  ));

  if let Some(footer) = footer {
    sections.push("\n--------------------------\n".to_string());
    sections.push(footer.to_string());
  }

  ReleaseDraft {
    tag: date.format("%Y%m%d").to_string(),
    target: head_sha.to_string(),
    title: format!("{} auto-release", date.format("%B %d, %Y")),
    body: sections.join("\n"),
    draft: false,
    prerelease: false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn change(name: &str, link: &str, kind: ChangeKind) -> ReleaseChange {
    ReleaseChange {
      name: name.to_string(),
      link: link.to_string(),
      kind,
    }
  }

  fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 6).unwrap()
  }

  #[test]
  fn test_tag_and_title_are_date_derived() {
    let draft = compose(sample_date(), "headsha", &[], &ContributorTally::new(), None);
    assert_eq!(draft.tag, "20250806");
    assert_eq!(draft.title, "August 06, 2025 auto-release");
    assert_eq!(draft.target, "headsha");
    assert!(!draft.draft);
    assert!(!draft.prerelease);
  }

  #[test]
  fn test_body_renders_added_and_updated_sections() {
    let changes = vec![
      change("New_Lib", "https://github.com/acme/New_Lib/releases/1.0.0", ChangeKind::Added),
      change("Old_Lib", "https://github.com/acme/Old_Lib/releases/1.2.0", ChangeKind::Updated),
    ];
    let mut tally = ContributorTally::new();
    tally.credit("alice", 2);

    let draft = compose(sample_date(), "headsha", &changes, &tally, None);
    assert!(
      draft
        .body
        .contains("New libraries: [New_Lib](https://github.com/acme/New_Lib/releases/1.0.0)")
    );
    assert!(
      draft
        .body
        .contains("Updated libraries: [Old_Lib](https://github.com/acme/Old_Lib/releases/1.2.0)")
    );
    assert!(draft.body.contains("thank you to all of our contributors: @alice"));
  }

  #[test]
  fn test_empty_change_lists_are_skipped() {
    let changes = vec![change("Only_Update", "link", ChangeKind::Updated)];
    let draft = compose(sample_date(), "headsha", &changes, &ContributorTally::new(), None);
    assert!(!draft.body.contains("New libraries:"));
    assert!(draft.body.contains("Updated libraries:"));
  }

  #[test]
  fn test_removed_and_list_only_never_surface() {
    let changes = vec![
      change("Gone_Lib", "link", ChangeKind::Removed),
      change("Listing", "link", ChangeKind::ListOnly),
    ];
    let draft = compose(sample_date(), "headsha", &changes, &ContributorTally::new(), None);
    assert!(!draft.body.contains("Gone_Lib"));
    assert!(!draft.body.contains("Listing"));
  }

  #[test]
  fn test_contributors_ranked_descending_stable() {
    let mut tally = ContributorTally::new();
    tally.credit("one", 1);
    tally.credit("five", 5);
    tally.credit("uno", 1);

    let draft = compose(sample_date(), "headsha", &[], &tally, None);
    assert!(draft.body.contains("@five, @one, @uno"));
  }

  #[test]
  fn test_footer_appended_after_separator() {
    let draft = compose(
      sample_date(),
      "headsha",
      &[],
      &ContributorTally::new(),
      Some("Download the zip that matches your firmware."),
    );
    let separator = draft.body.find("--------------------------").unwrap();
    let footer = draft.body.find("Download the zip").unwrap();
    assert!(separator < footer);
  }

  #[test]
  fn test_payload_field_names() {
    let draft = compose(sample_date(), "headsha", &[], &ContributorTally::new(), None);
    let json = serde_json::to_value(&draft).unwrap();
    assert_eq!(json["tag_name"], "20250806");
    assert_eq!(json["target_commitish"], "headsha");
    assert_eq!(json["name"], "August 06, 2025 auto-release");
    assert_eq!(json["draft"], false);
    assert_eq!(json["prerelease"], false);
  }

  #[test]
  fn test_release_link() {
    assert_eq!(
      release_link("https://github.com/acme/Lib", "1.2.0"),
      "https://github.com/acme/Lib/releases/1.2.0"
    );
  }
}
