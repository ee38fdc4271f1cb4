//! Error types and helpers for user-friendly error messages
//!
//! Every failure in nfbuild is fatal. The variant decides the process exit
//! code, so CI sees the same status the failing tool reported.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code used for usage errors (matches clap's own convention)
pub const USAGE_EXIT_CODE: i32 = 2;

/// Exit code used when a required tool is not on PATH
pub const MISSING_TOOL_EXIT_CODE: i32 = 127;

/// Custom error types with helpful context and suggestions
#[derive(Error, Debug)]
pub enum NfBuildError {
    /// Registry or configuration file errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        hint: Option<String>,
    },

    /// Unrecognized command-line input
    #[error("Usage error: {message}")]
    Usage { message: String, usage: String },

    /// An external tool exited non-zero
    #[error("{tool} failed with exit code {code}")]
    ToolFailure { tool: String, code: i32 },

    /// Tool/executable not found
    #[error("Missing tool: {tool}")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// Built binary could not be located in the build directory
    #[error("Could not find binary '{target}' in {}", search_dir.display())]
    BinaryNotFound { target: String, search_dir: PathBuf },
}

impl NfBuildError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a configuration error with a hint
    pub fn config_error_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create a usage error carrying the rendered usage text
    pub fn usage_error(message: impl Into<String>, usage: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            usage: usage.into(),
        }
    }

    /// Create a tool failure error
    pub fn tool_failure(tool: impl Into<String>, code: i32) -> Self {
        Self::ToolFailure {
            tool: tool.into(),
            code,
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            NfBuildError::ToolFailure { code, .. } => *code,
            NfBuildError::Usage { .. } => USAGE_EXIT_CODE,
            NfBuildError::MissingTool { .. } => MISSING_TOOL_EXIT_CODE,
            NfBuildError::Config { .. } | NfBuildError::BinaryNotFound { .. } => 1,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        match self {
            NfBuildError::Config { hint: Some(h), .. } => {
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
            }
            NfBuildError::MissingTool {
                required_for, hint, ..
            } => {
                eprintln!("Required for: {}", required_for);
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
            NfBuildError::BinaryNotFound { .. } => {
                eprintln!(
                    "\n{} {}",
                    style("HINT:").yellow().bold(),
                    hints::binary_not_found()
                );
            }
            NfBuildError::Usage { usage, .. } => {
                eprintln!("\n{}", usage);
            }
            _ => {}
        }

        eprintln!();
    }
}

/// Exit code for any error surfaced to `main`
///
/// Errors that are not an [`NfBuildError`] (I/O, parse failures wrapped in
/// context) map to 1.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<NfBuildError>()
        .map(NfBuildError::exit_code)
        .unwrap_or(1)
}

/// Common error hints for missing tools
pub mod hints {
    /// Get hint for missing CMake
    pub fn cmake() -> &'static str {
        "Install CMake from https://cmake.org/ or use your package manager:\n\
         • macOS: brew install cmake\n\
         • Ubuntu: sudo apt install cmake"
    }

    /// Get hint for missing Ninja
    pub fn ninja() -> &'static str {
        "Install Ninja with your package manager:\n\
         • macOS: brew install ninja\n\
         • Ubuntu: sudo apt install ninja-build"
    }

    /// Get hint for missing Xcode
    pub fn xcode() -> &'static str {
        "Install Xcode from the App Store:\n\
         1. Open App Store\n\
         2. Search for 'Xcode'\n\
         3. Click Install\n\
         4. Run: sudo xcode-select --install"
    }

    /// Get hint for missing clang-format
    pub fn clang_format() -> &'static str {
        "Install clang-format:\n\
         • macOS: brew install clang-format\n\
         • Ubuntu: sudo apt install clang-format"
    }

    /// Get hint for missing cmakelint
    pub fn cmake_lint() -> &'static str {
        "Install cmakelint with pip:\n\
         • pip install cmakelint"
    }

    /// Get hint for a test binary that was never built
    pub fn binary_not_found() -> &'static str {
        "Build the target first, e.g. run with --generateProject --buildTargetLibrary,\n\
         or check `build_directory` and `unit_tests` in nfbuild.toml."
    }

    /// Get hint for invalid nfbuild.toml
    pub fn invalid_config() -> &'static str {
        "nfbuild.toml is invalid. Common issues:\n\
         • Invalid TOML syntax (check quotes, brackets, commas)\n\
         • build_type must be \"Debug\" or \"Release\"\n\
         • build_directory must not be the project root or one of its parents\n\
         • Tool names under [tools] must not be empty"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failure_keeps_exit_code() {
        let err = NfBuildError::tool_failure("cmake", 3);
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "cmake failed with exit code 3");
    }

    #[test]
    fn test_exit_code_through_anyhow() {
        let err: anyhow::Error = NfBuildError::tool_failure("ninja", 42).into();
        let err = err.context("Failed to build target NFLoggerTest");
        assert_eq!(exit_code_for(&err), 42);
    }

    #[test]
    fn test_exit_codes_per_category() {
        assert_eq!(NfBuildError::config_error("dup").exit_code(), 1);
        assert_eq!(
            NfBuildError::usage_error("bad flag", "usage").exit_code(),
            USAGE_EXIT_CODE
        );
        assert_eq!(
            NfBuildError::missing_tool("ninja", "building", hints::ninja()).exit_code(),
            MISSING_TOOL_EXIT_CODE
        );
        assert_eq!(exit_code_for(&anyhow::anyhow!("plain")), 1);
    }
}
