//! Package index existence lookup for listing-document links

/// Whether `package` exists on PyPI. A transport failure is logged and
/// reported as "not found": the listing link is simply omitted.
pub fn package_exists(http: &reqwest::blocking::Client, package: &str) -> bool {
  let url = format!("https://pypi.org/pypi/{}/json", package);
  match http.get(&url).send() {
    Ok(response) => response.status().is_success(),
    Err(err) => {
      log::warn!("PyPI lookup for '{}' failed: {}", package, err);
      false
    }
  }
}
