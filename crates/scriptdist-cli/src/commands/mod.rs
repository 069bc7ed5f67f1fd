//! Command handlers. Each one translates arguments into core calls and
//! renders the result; no release rules live here.

pub mod assemble;
pub mod checksum;
pub mod completions;
pub mod config;
pub mod context;
pub mod init;
pub mod release;
pub mod version;
