//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `scriptdist-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `Archiver`: Deterministic archive encoding
//!   - `Digester`: Checksums
//!   - `ParserGenerator`: CLI-parser generation
//!   - `ReleaseHost`: Remote release records and assets
//!   - `TagStore`: Git tags
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    ArchiveEntry, Archiver, Digester, Filesystem, ParserGenerator, ReleaseHost, TagStore,
};

#[cfg(test)]
pub use output::{
    MockArchiver, MockDigester, MockFilesystem, MockParserGenerator, MockReleaseHost,
    MockTagStore,
};
