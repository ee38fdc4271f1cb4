//! Configuration for nfbuild
//!
//! Settings come from `nfbuild.toml` in the project root, or the legacy
//! `ci/ci.json` used by the older CI scripts. Every key is optional.

mod nfbuild_toml;

pub use nfbuild_toml::NfBuildConfig;
