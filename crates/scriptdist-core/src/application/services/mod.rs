//! Application services - orchestrate use cases.
//!
//! Each service owns one pipeline stage; `ReleasePipeline` chains them.

pub mod assembly_service;
pub mod checksum_service;
pub mod pipeline;
pub mod publish_service;
pub mod tag_service;
pub mod version_service;

pub use assembly_service::{AssemblyConfig, AssemblyService};
pub use checksum_service::{ChecksumConfig, ChecksumService};
pub use pipeline::{PipelineOptions, PipelineReport, ReleasePipeline, Stage};
pub use publish_service::{PublishReceipt, PublishRequest, PublishService};
pub use tag_service::{TagOutcome, TagService};
pub use version_service::VersionService;
