//! Thin REST collaborators: release hosting and the package index
//!
//! All calls are synchronous and blocking. Non-2xx responses surface the
//! request URL and response body for diagnosis and are never retried.

pub mod github;
pub mod pypi;
