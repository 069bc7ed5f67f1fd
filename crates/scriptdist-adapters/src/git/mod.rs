//! Tag store adapters.

mod memory;
mod system_git;

pub use memory::InMemoryTagStore;
pub use system_git::SystemGit;
