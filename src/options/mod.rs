//! Build options and workflows
//!
//! An option is a named boolean build step. A workflow is a named bundle of
//! options representing a common CI task ("lint", "clang_build", ...).

mod registry;
mod resolved;

pub use registry::BuildOptions;
pub use resolved::ResolvedOptions;
