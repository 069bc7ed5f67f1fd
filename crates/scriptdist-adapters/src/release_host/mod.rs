//! Release host adapters.

mod github;
mod memory;

pub use github::{GitHubConfig, GitHubReleaseHost};
pub use memory::{HostCall, InMemoryReleaseHost};
