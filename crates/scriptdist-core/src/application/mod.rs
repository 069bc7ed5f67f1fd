//! Application layer for scriptdist.
//!
//! This layer contains:
//! - **Services**: One per pipeline stage, plus `ReleasePipeline`
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//! - **Retry**: Backoff policy for remote calls
//!
//! The application layer coordinates the domain layer but contains no
//! release rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod retry;
pub mod services;

// Re-export main services
pub use services::{
    AssemblyConfig, AssemblyService, ChecksumConfig, ChecksumService, PipelineOptions,
    PipelineReport, PublishReceipt, PublishRequest, PublishService, ReleasePipeline, Stage,
    TagOutcome, TagService, VersionService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    ArchiveEntry, Archiver, Digester, Filesystem, ParserGenerator, ReleaseHost, TagStore,
};

pub use error::ApplicationError;
pub use retry::{RetryPolicy, with_retry};
