//! Core building blocks for bundlebot
//!
//! - **config**: bundlebot.toml parsing and validation
//! - **error**: categorized error types with exit codes
//! - **vcs**: git operations abstraction (SystemGit)

pub mod config;
pub mod error;
pub mod vcs;
