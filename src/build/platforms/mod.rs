//! Platform-specific registries and adapters
//!
//! Each platform declares its own options and workflows and provides one
//! [`PlatformAdapter`] implementation. The step plan itself is shared.

pub mod linux;
pub mod macos;

use anyhow::Result;
use clap::ValueEnum;

use super::PlatformAdapter;
use crate::options::BuildOptions;

/// Supported build hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Linux,
    Macos,
}

impl Platform {
    /// Platform matching the machine nfbuild runs on
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Macos
        } else {
            Platform::Linux
        }
    }

    /// Parse a platform name as accepted on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_str(name, true).ok()
    }

    /// Options and workflows available on this platform
    pub fn registry(&self) -> Result<BuildOptions> {
        let mut options = BuildOptions::new();
        match self {
            Platform::Linux => linux::register(&mut options)?,
            Platform::Macos => macos::register(&mut options)?,
        }
        Ok(options)
    }

    /// Adapter driving this platform's toolchain
    pub fn adapter(&self) -> Box<dyn PlatformAdapter> {
        match self {
            Platform::Linux => Box::new(linux::LinuxAdapter::new()),
            Platform::Macos => Box::new(macos::MacosAdapter::new()),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::Macos => write!(f, "macos"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Platform::from_name("linux"), Some(Platform::Linux));
        assert_eq!(Platform::from_name("MacOS"), Some(Platform::Macos));
        assert_eq!(Platform::from_name("windows"), None);
    }

    #[test]
    fn test_registries_are_valid() {
        for platform in [Platform::Linux, Platform::Macos] {
            let registry = platform.registry().unwrap();
            assert!(registry.default_workflow().is_some());
            assert!(registry.option("lintCmake").is_some());
        }
    }

    #[test]
    fn test_adapter_matches_platform() {
        assert_eq!(Platform::Linux.adapter().platform_name(), "linux");
        assert_eq!(Platform::Macos.adapter().platform_name(), "macos");
        assert_eq!(Platform::Macos.adapter().generator(), "Xcode");
    }
}
