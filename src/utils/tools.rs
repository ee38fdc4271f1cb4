//! Tool detection
//!
//! Programs are resolved on PATH before they are spawned so a missing tool
//! produces an install hint instead of a bare "No such file" error.

use std::path::{Path, PathBuf};

use anyhow::Result;
use which::which;

use crate::error::{hints, NfBuildError};

/// Resolve a program name to an executable path
///
/// Names containing a path separator are taken as paths and only checked for
/// existence.
pub fn resolve_program(program: &str) -> Result<PathBuf> {
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        if as_path.exists() {
            return Ok(as_path.to_path_buf());
        }
        return Err(missing(program));
    }

    which(program).map_err(|_| missing(program))
}

fn missing(program: &str) -> anyhow::Error {
    NfBuildError::missing_tool(program, required_for(program), get_tool_hint(program)).into()
}

/// Get installation hint for a tool
fn get_tool_hint(program: &str) -> &'static str {
    match tool_stem(program) {
        "cmake" => hints::cmake(),
        "ninja" => hints::ninja(),
        "xcodebuild" => hints::xcode(),
        "clang-format" => hints::clang_format(),
        "cmakelint" => hints::cmake_lint(),
        _ => "Install this tool and ensure it's in your PATH",
    }
}

/// What a tool is used for, for error messages
fn required_for(program: &str) -> &'static str {
    match tool_stem(program) {
        "cmake" => "generateProject",
        "ninja" | "xcodebuild" => "buildTargetLibrary",
        "clang-format" => "lintCpp / lintCppWithInlineChange",
        "cmakelint" => "lintCmake",
        _ => "this build step",
    }
}

fn tool_stem(program: &str) -> &str {
    Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_has_hint() {
        let err = resolve_program("/nonexistent/bin/ninja").unwrap_err();
        match err.downcast_ref::<NfBuildError>() {
            Some(NfBuildError::MissingTool {
                tool,
                required_for,
                hint,
            }) => {
                assert_eq!(tool, "/nonexistent/bin/ninja");
                assert_eq!(required_for, "buildTargetLibrary");
                assert!(hint.contains("ninja"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_resolves_common_tool() {
        assert!(resolve_program("sh").is_ok());
        assert!(resolve_program("nfbuild-definitely-not-installed").is_err());
    }
}
