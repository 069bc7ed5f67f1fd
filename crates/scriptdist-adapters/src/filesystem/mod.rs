//! Filesystem adapters: the real disk and an in-memory tree for tests.
//!
//! Both honour the executable bit, which the archiver carries into zip
//! entries.

mod local;
mod memory;

pub use local::LocalFilesystem;
pub use memory::MemoryFilesystem;
