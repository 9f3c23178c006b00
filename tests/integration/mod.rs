//! Integration tests for bundlebot
//!
//! These run against real temporary git repositories and the built
//! binary. Nothing here touches the network: bundles under test carry no
//! submodules, so listing regeneration performs no index lookups.

mod helpers;
mod test_cli;
mod test_git;
mod test_listing;
