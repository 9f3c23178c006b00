//! Status Scanner: typed change records out of raw git text
//!
//! All text scraping of git output lives in this module. Two inputs are
//! understood:
//!
//! - `git status --short` plus per-path `git diff --submodule=log`, after
//!   the working tree has been fast-forwarded (worktree scan)
//! - `git diff --submodule=short <last_tag>..` at release time (range scan)
//!
//! If git ever changes these formats, this is the only file to touch.

use crate::bundle::{ChangeKind, ChangeRecord};
use crate::core::error::{BotError, BotResult, ScanError};
use crate::core::vcs::SystemGit;

/// A reference range plus free-text summary from `diff --submodule=log`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefRange {
  pub old: String,
  pub new: String,
  pub summary: String,
}

/// A submodule pointer move parsed from `diff --submodule=short` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeChange {
  pub path: String,
  pub old: String,
  pub new: String,
  pub kind: ChangeKind,
}

/// Classify a reference range by the all-zero sentinel git uses for
/// absent sides
fn classify(old: &str, new: &str) -> ChangeKind {
  if is_zero_sentinel(old) {
    ChangeKind::Added
  } else if is_zero_sentinel(new) {
    ChangeKind::Removed
  } else {
    ChangeKind::Updated
  }
}

fn is_zero_sentinel(reference: &str) -> bool {
  !reference.is_empty() && reference.chars().all(|c| c == '0')
}

/// Accept the modified-submodule paths out of a short status report.
///
/// The listing document's own status line is recognized and skipped first;
/// it is handled by the list synchronizer, not treated as a library change.
/// Anything other than `M <path-under-libraries-root>` is an unsupported
/// change and fatal for the bundle.
pub fn parse_status(status: &str, libraries_root: &str, listing_doc: &str) -> BotResult<Vec<String>> {
  let mut accepted = Vec::new();

  for line in status.lines() {
    if line.trim().is_empty() {
      continue;
    }
    let mut fields = line.split_whitespace();
    let action = fields.next().unwrap_or_default();
    let Some(path) = fields.next() else {
      return Err(BotError::Scan(ScanError::UnsupportedChange { line: line.to_string() }));
    };

    if path.ends_with(listing_doc) {
      continue;
    }
    if action != "M" || !path.starts_with(libraries_root) {
      return Err(BotError::Scan(ScanError::UnsupportedChange { line: line.to_string() }));
    }

    accepted.push(path.to_string());
  }

  Ok(accepted)
}

/// Parse one `git diff --submodule=log` block.
///
/// The first line carries `old..new` (or `old...new`) in its third field,
/// trailing `:` stripped; the range is split on `.` and the first and last
/// tokens used. The remaining lines minus the trailing empty footer form
/// the free-text summary.
pub fn parse_submodule_log(diff: &str) -> BotResult<RefRange> {
  let mut lines: Vec<&str> = diff.split('\n').collect();

  let header = lines.first().copied().unwrap_or_default();
  let range_token = header
    .split_whitespace()
    .nth(2)
    .map(|token| token.trim_end_matches(':'))
    .ok_or_else(|| {
      BotError::Scan(ScanError::MalformedDiff {
        detail: format!("no reference range in '{}'", header),
      })
    })?;

  let (old, new) = split_range(range_token)?;

  if matches!(lines.last(), Some(last) if last.is_empty()) {
    lines.pop();
  }
  let summary = if lines.len() > 1 { lines[1..].join("\n") } else { String::new() };

  Ok(RefRange { old, new, summary })
}

fn split_range(token: &str) -> BotResult<(String, String)> {
  let mut pieces = token.split('.');
  let old = pieces.next().unwrap_or_default().to_string();
  let new = pieces.next_back().unwrap_or_default().to_string();

  if old.is_empty() || new.is_empty() {
    return Err(BotError::Scan(ScanError::MalformedDiff {
      detail: format!("unusable reference range '{}'", token),
    }));
  }

  Ok((old, new))
}

/// Scan a fast-forwarded working tree into change records.
///
/// Reference fields hold raw commit identifiers; tag resolution is the
/// resolver's job and happens downstream.
pub fn scan_worktree(git: &SystemGit, libraries_root: &str, listing_doc: &str) -> BotResult<Vec<ChangeRecord>> {
  let status = git.status_short()?;
  if status.trim().is_empty() {
    return Ok(Vec::new());
  }

  let mut records = Vec::new();
  for path in parse_status(&status, libraries_root, listing_doc)? {
    let diff = git.diff_submodule_log(&path)?;
    let range = parse_submodule_log(&diff)?;
    let kind = classify(&range.old, &range.new);

    if kind == ChangeKind::Removed {
      // Detected, recorded, and never processed further.
      records.push(ChangeRecord {
        url: path.clone(),
        old_ref: range.old,
        new_ref: range.new,
        summary: range.summary,
        kind,
      });
      continue;
    }

    let url = git.submodule(&path).remote_url("origin")?;
    let url = url.strip_suffix(".git").unwrap_or(&url).to_string();
    records.push(ChangeRecord {
      url,
      old_ref: range.old,
      new_ref: range.new,
      summary: range.summary,
      kind,
    });
  }

  Ok(records)
}

/// Parse `git diff --submodule=short <range>` output into pointer moves.
///
/// `diff --git` lines carry the submodule path, `index` lines the
/// reference range, and a `+Subproject` line commits the candidate.
pub fn parse_submodule_short_diff(diff: &str) -> BotResult<Vec<RangeChange>> {
  let mut changes = Vec::new();
  let mut current_path: Option<String> = None;
  let mut current_index: Option<String> = None;

  for line in diff.lines() {
    if line.starts_with("diff") {
      let last = line.split_whitespace().next_back().unwrap_or_default();
      current_path = Some(last.strip_prefix("b/").unwrap_or(last).to_string());
      current_index = None;
      continue;
    }
    if line.starts_with("index") {
      current_index = line.split_whitespace().nth(1).map(|s| s.to_string());
      continue;
    }
    if !line.starts_with("+Subproject") {
      continue;
    }

    let path = current_path.clone().ok_or_else(|| {
      BotError::Scan(ScanError::MalformedDiff {
        detail: "subproject change without a preceding diff header".to_string(),
      })
    })?;
    let index = current_index.clone().ok_or_else(|| {
      BotError::Scan(ScanError::MalformedDiff {
        detail: format!("subproject change for '{}' without an index line", path),
      })
    })?;

    let (old, new) = split_range(&index)?;
    changes.push(RangeChange {
      path,
      kind: classify(&old, &new),
      old,
      new,
    });
  }

  Ok(changes)
}
