//! Digest adapters.

mod sha;

pub use sha::ShaDigester;
