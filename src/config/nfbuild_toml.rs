//! nfbuild.toml configuration parsing
//!
//! # Example
//!
//! ```toml
//! build_directory = "build"
//! build_type = "Release"
//! library_target = "NFLoggerTest"
//! unit_tests = ["NFLoggerTest"]
//! cpp_lint_directories = ["source", "include"]
//!
//! [macos]
//! sdk = "macosx"
//! arch = "arm64"
//!
//! [tools]
//! cmake = "/opt/cmake/bin/cmake"
//! ```

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::build::cmake::BuildType;
use crate::error::{hints, NfBuildError};

/// Default config file name, looked up in the project root
pub const CONFIG_FILE: &str = "nfbuild.toml";

/// Config file used by the older CI scripts
pub const LEGACY_CONFIG_FILE: &str = "ci/ci.json";

/// Root configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NfBuildConfig {
    /// Build directory, relative to the project root
    pub build_directory: PathBuf,

    /// Build type used unless the `debug` option is enabled
    pub build_type: BuildType,

    /// Target built by `buildTargetLibrary`
    pub library_target: String,

    /// Project name, used for the Xcode project bundle
    pub project_name: String,

    /// Test binaries run by `unitTests`
    pub unit_tests: Vec<String>,

    /// Directories searched for CMakeLists.txt, besides the root one
    pub cmake_lint_directories: Vec<PathBuf>,

    /// Directories searched for C++/ObjC sources to format-check
    pub cpp_lint_directories: Vec<PathBuf>,

    /// macOS specific settings
    pub macos: MacosConfig,

    /// Tool executables
    pub tools: ToolsConfig,
}

impl Default for NfBuildConfig {
    fn default() -> Self {
        Self {
            build_directory: PathBuf::from("build"),
            build_type: BuildType::Release,
            library_target: "NFLoggerTest".to_string(),
            project_name: "NFLogger".to_string(),
            unit_tests: vec!["NFLoggerTest".to_string()],
            cmake_lint_directories: vec![PathBuf::from("source")],
            cpp_lint_directories: vec![PathBuf::from("source"), PathBuf::from("include")],
            macos: MacosConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Settings for xcodebuild
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MacosConfig {
    pub sdk: String,
    pub arch: String,
}

impl Default for MacosConfig {
    fn default() -> Self {
        Self {
            sdk: "macosx".to_string(),
            arch: host_arch().to_string(),
        }
    }
}

/// Map the host architecture to the name Xcode uses
fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "aarch64" => "arm64",
        _ => "x86_64",
    }
}

/// Tool executable names or paths
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub cmake: String,
    pub ninja: String,
    pub xcodebuild: String,
    pub clang_format: String,
    pub cmake_lint: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            cmake: "cmake".to_string(),
            ninja: "ninja".to_string(),
            xcodebuild: "xcodebuild".to_string(),
            clang_format: "clang-format".to_string(),
            cmake_lint: "cmakelint".to_string(),
        }
    }
}

impl ToolsConfig {
    fn validate(&self) -> Result<()> {
        let tools = [
            ("cmake", &self.cmake),
            ("ninja", &self.ninja),
            ("xcodebuild", &self.xcodebuild),
            ("clang_format", &self.clang_format),
            ("cmake_lint", &self.cmake_lint),
        ];
        for (key, value) in tools {
            if value.trim().is_empty() {
                return Err(NfBuildError::config_error_with_hint(
                    format!("[tools] {} must not be empty", key),
                    hints::invalid_config(),
                )
                .into());
            }
        }
        Ok(())
    }
}

impl NfBuildConfig {
    /// Load configuration for a project
    ///
    /// An explicit path must exist. Otherwise `nfbuild.toml`, then
    /// `ci/ci.json`, are tried in `project_root`, falling back to defaults.
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let toml_path = project_root.join(CONFIG_FILE);
        if toml_path.exists() {
            return Self::load_from_path(&toml_path);
        }

        let json_path = project_root.join(LEGACY_CONFIG_FILE);
        if json_path.exists() {
            return Self::load_from_path(&json_path);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific path, picking the format by extension
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            Self::parse_json(&content)
        } else {
            Self::parse(&content)
        };
        parsed.with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            NfBuildError::config_error_with_hint(
                format!("Failed to parse {}: {}", CONFIG_FILE, e),
                hints::invalid_config(),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from the legacy JSON format
    pub fn parse_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content).map_err(|e| {
            NfBuildError::config_error(format!("Failed to parse {}: {}", LEGACY_CONFIG_FILE, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let names_a_directory = self
            .build_directory
            .components()
            .any(|c| matches!(c, Component::Normal(_)));
        if !names_a_directory {
            return Err(NfBuildError::config_error_with_hint(
                format!(
                    "build_directory '{}' must not be empty, the project root or one of its parents",
                    self.build_directory.display()
                ),
                hints::invalid_config(),
            )
            .into());
        }
        if self.library_target.is_empty() {
            return Err(NfBuildError::config_error("library_target must not be empty").into());
        }
        self.tools.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = NfBuildConfig::parse("").unwrap();
        assert_eq!(config.build_directory, PathBuf::from("build"));
        assert_eq!(config.build_type, BuildType::Release);
        assert_eq!(config.library_target, "NFLoggerTest");
        assert_eq!(config.unit_tests, vec!["NFLoggerTest"]);
        assert_eq!(config.tools.cmake, "cmake");
        assert_eq!(config.tools.cmake_lint, "cmakelint");
        assert_eq!(config.macos.sdk, "macosx");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
build_directory = "out"
build_type = "Debug"
library_target = "MyLibTest"
project_name = "MyLib"
unit_tests = ["MyLibTest", "MyLibOtherTest"]
cpp_lint_directories = ["src"]

[macos]
arch = "x86_64"

[tools]
ninja = "/usr/local/bin/ninja"
"#;
        let config = NfBuildConfig::parse(toml).unwrap();
        assert_eq!(config.build_directory, PathBuf::from("out"));
        assert_eq!(config.build_type, BuildType::Debug);
        assert_eq!(config.unit_tests.len(), 2);
        assert_eq!(config.cpp_lint_directories, vec![PathBuf::from("src")]);
        assert_eq!(config.macos.arch, "x86_64");
        assert_eq!(config.macos.sdk, "macosx");
        assert_eq!(config.tools.ninja, "/usr/local/bin/ninja");
        assert_eq!(config.tools.cmake, "cmake");
    }

    #[test]
    fn test_invalid_build_type_rejected() {
        let err = NfBuildConfig::parse("build_type = \"Fast\"").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NfBuildError>(),
            Some(NfBuildError::Config { .. })
        ));
    }

    #[test]
    fn test_empty_tool_rejected() {
        let err = NfBuildConfig::parse("[tools]\ncmake = \"\"").unwrap_err();
        assert!(err.to_string().contains("cmake"));
    }

    #[test]
    fn test_build_directory_must_name_a_directory() {
        for value in ["", ".", "./", "..", "../..", "/"] {
            let err = NfBuildConfig::parse(&format!("build_directory = \"{}\"", value))
                .unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<NfBuildError>(),
                    Some(NfBuildError::Config { .. })
                ),
                "'{}' was accepted",
                value
            );
        }
        assert!(NfBuildConfig::parse("build_directory = \"../nflogger-build\"").is_ok());
        assert!(NfBuildConfig::parse("build_directory = \"out/linux\"").is_ok());
    }

    #[test]
    fn test_parse_legacy_json() {
        let config = NfBuildConfig::parse_json(r#"{"unit_tests": ["NFLoggerTest"]}"#).unwrap();
        assert_eq!(config.unit_tests, vec!["NFLoggerTest"]);
        assert_eq!(config.build_directory, PathBuf::from("build"));
    }

    #[test]
    fn test_load_prefers_toml_over_json() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("ci")).unwrap();
        std::fs::write(
            dir.path().join(LEGACY_CONFIG_FILE),
            r#"{"library_target": "FromJson"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "library_target = \"FromToml\"").unwrap();

        let config = NfBuildConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.library_target, "FromToml");

        std::fs::remove_file(dir.path().join(CONFIG_FILE)).unwrap();
        let config = NfBuildConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.library_target, "FromJson");
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = NfBuildConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.library_target, "NFLoggerTest");
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(NfBuildConfig::load(dir.path(), Some(&missing)).is_err());
    }
}
