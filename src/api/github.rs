//! Release-hosting REST client (blocking)

use crate::bundle::contributors::{CommitIdentityLookup, ResolvedIdentities};
use crate::bundle::release::ReleaseDraft;
use crate::core::error::{ApiError, BotError, BotResult};

/// Blocking client for the release-hosting API
pub struct GitHubClient {
  http: reqwest::blocking::Client,
  api_root: String,
  token: Option<String>,
}

impl GitHubClient {
  /// Build a client against `api_root`, picking up `GITHUB_TOKEN` from
  /// the environment when present.
  pub fn new(api_root: &str) -> BotResult<Self> {
    let http = reqwest::blocking::Client::builder()
      .user_agent(concat!("bundlebot/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self {
      http,
      api_root: api_root.trim_end_matches('/').to_string(),
      token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
    })
  }

  /// Token available for pushable clones
  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  /// A plain HTTP handle for collaborators that share the transport
  pub fn http(&self) -> &reqwest::blocking::Client {
    &self.http
  }

  /// Tag name of the latest published release, or None when the
  /// repository has never released (404).
  pub fn latest_release_tag(&self, slug: &str) -> BotResult<Option<String>> {
    let url = format!("{}/repos/{}/releases/latest", self.api_root, slug);
    let response = self.get(&url)?;

    if response.status().as_u16() == 404 {
      return Ok(None);
    }
    let response = Self::require_success(url, response)?;

    let json: serde_json::Value = response.json()?;
    Ok(json.get("tag_name").and_then(|tag| tag.as_str()).map(String::from))
  }

  /// Publish a release draft
  pub fn create_release(&self, slug: &str, draft: &ReleaseDraft) -> BotResult<()> {
    let url = format!("{}/repos/{}/releases", self.api_root, slug);
    let mut request = self.http.post(&url).header("Accept", "application/vnd.github+json");
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    let response = request.json(draft).send()?;
    Self::require_success(url, response)?;
    Ok(())
  }

  fn get(&self, url: &str) -> BotResult<reqwest::blocking::Response> {
    let mut request = self.http.get(url).header("Accept", "application/vnd.github+json");
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }
    Ok(request.send()?)
  }

  /// Map a non-2xx response into an error carrying URL and body
  fn require_success(url: String, response: reqwest::blocking::Response) -> BotResult<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(BotError::Api(ApiError::Status {
      url,
      status: status.as_u16(),
      body,
    }))
  }
}

impl CommitIdentityLookup for GitHubClient {
  fn commit_identities(&self, repo_slug: &str, sha: &str) -> BotResult<ResolvedIdentities> {
    let url = format!("{}/repos/{}/commits/{}", self.api_root, repo_slug, sha);
    let response = self.get(&url)?;
    let response = Self::require_success(url, response)?;
    let json: serde_json::Value = response.json()?;
    Ok(identities_from_json(&json))
  }
}

/// Pull author/committer handles out of a commit-detail payload.
/// Either side may be null when the platform cannot match an account.
fn identities_from_json(json: &serde_json::Value) -> ResolvedIdentities {
  let login = |side: &str| {
    json
      .get(side)
      .and_then(|value| value.get("login"))
      .and_then(|login| login.as_str())
      .map(String::from)
  };

  ResolvedIdentities {
    author: login("author"),
    committer: login("committer"),
  }
}
