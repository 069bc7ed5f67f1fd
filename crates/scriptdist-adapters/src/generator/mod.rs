//! CLI-parser generator adapters.

mod argbash;
mod prebuilt;

pub use argbash::{ArgbashGenerator, TEMPLATE_EXCLUDES, TEMPLATE_PATTERN};
pub use prebuilt::PrebuiltParsers;
