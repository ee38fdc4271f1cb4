//! Source linting
//!
//! - CMake files are checked with cmakelint.
//! - C++/Objective-C sources are checked with clang-format: either compared
//!   against the formatted output, or rewritten in place.
//!
//! Every file is checked before a lint step fails, so one run reports all
//! offending files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use super::BuildContext;
use crate::error::NfBuildError;
use crate::exec::{CommandRunner, ToolCommand};
use crate::utils::terminal::{print_error, print_info};

/// Extensions clang-format is run on
pub const CPP_EXTENSIONS: &[&str] = &["cpp", "h", "m", "mm"];

const CMAKE_LISTS: &str = "CMakeLists.txt";

/// Files matching `keep` under `dir`, in a stable order
fn collect_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && keep(e.path()))
        .map(|e| e.into_path())
        .collect()
}

/// CMake files to lint: the root CMakeLists.txt, then every one under the
/// configured directories
pub fn cmake_files(ctx: &BuildContext) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let root_lists = ctx.project_root.join(CMAKE_LISTS);
    if root_lists.is_file() {
        files.push(root_lists);
    }
    for dir in &ctx.config.cmake_lint_directories {
        files.extend(collect_files(&ctx.project_root.join(dir), |p| {
            p.file_name().map(|n| n == CMAKE_LISTS).unwrap_or(false)
        }));
    }
    files
}

/// C++ sources to lint under the configured directories
pub fn cpp_files(ctx: &BuildContext) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for dir in &ctx.config.cpp_lint_directories {
        files.extend(collect_files(&ctx.project_root.join(dir), |p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| CPP_EXTENSIONS.contains(&ext))
                .unwrap_or(false)
        }));
    }
    files
}

/// Run cmakelint on every CMake file
pub fn lint_cmake(ctx: &BuildContext, runner: &mut dyn CommandRunner) -> Result<()> {
    let linter = &ctx.config.tools.cmake_lint;
    let mut first_failure = None;

    for file in cmake_files(ctx) {
        print_info(&format!("Linting: {}", file.display()));
        let cmd = ToolCommand::new(linter)
            .arg(&file)
            .current_dir(&ctx.project_root);
        let result = runner
            .run(&cmd)
            .with_context(|| format!("Failed to lint {}", file.display()))?;

        if !result.success {
            print_error(&format!("{} failed CMake lint", file.display()));
            first_failure.get_or_insert(result.exit_code);
        }
    }

    match first_failure {
        Some(code) => Err(NfBuildError::tool_failure(linter, code).into()),
        None => Ok(()),
    }
}

/// Check (or fix, with `make_inline_changes`) formatting of C++ sources
pub fn lint_cpp(
    ctx: &BuildContext,
    make_inline_changes: bool,
    runner: &mut dyn CommandRunner,
) -> Result<()> {
    let formatter = &ctx.config.tools.clang_format;
    let mut tool_failure = None;
    let mut unformatted = 0usize;

    for file in cpp_files(ctx) {
        if make_inline_changes {
            let cmd = ToolCommand::new(formatter).arg("-i").arg(&file);
            let result = runner
                .run(&cmd)
                .with_context(|| format!("Failed to format {}", file.display()))?;
            if !result.success {
                print_error(&format!("clang-format could not fix {}", file.display()));
                tool_failure.get_or_insert(result.exit_code);
            }
            continue;
        }

        let current = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let cmd = ToolCommand::new(formatter).arg(&file);
        let result = runner
            .capture(&cmd)
            .with_context(|| format!("Failed to lint {}", file.display()))?;

        if !result.success {
            print_error(&format!(
                "clang-format failed on {}: {}",
                file.display(),
                result.stderr.trim()
            ));
            tool_failure.get_or_insert(result.exit_code);
        } else if result.stdout != current {
            unformatted += 1;
            print_error(&format!("{} failed C++ lint", file.display()));
            if ctx.verbose {
                eprintln!("File should look like:\n{}", result.stdout);
            }
        }
    }

    if let Some(code) = tool_failure {
        return Err(NfBuildError::tool_failure(formatter, code).into());
    }
    if unformatted > 0 {
        print_error(&format!(
            "{} file(s) need formatting, run with --lintCppWithInlineChange to fix",
            unformatted
        ));
        return Err(NfBuildError::tool_failure(format!("{} lint", formatter), 1).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NfBuildConfig;
    use crate::error::exit_code_for;
    use crate::exec::recording::RecordingRunner;
    use tempfile::TempDir;

    fn project() -> (TempDir, BuildContext) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for (path, content) in [
            ("CMakeLists.txt", "project(NFLogger)\n"),
            ("source/CMakeLists.txt", "add_library(NFLogger)\n"),
            ("source/tests/CMakeLists.txt", "add_executable(NFLoggerTest)\n"),
            ("source/Logger.cpp", "int x;\n"),
            ("source/notes.txt", "ignored\n"),
            ("include/NFLogger/Logger.h", "#pragma once\n"),
        ] {
            let full = root.join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        let ctx = BuildContext::new(root.to_path_buf(), NfBuildConfig::default(), false);
        (dir, ctx)
    }

    #[test]
    fn test_cmake_files_root_first() {
        let (dir, ctx) = project();
        let files = cmake_files(&ctx);
        assert_eq!(
            files,
            vec![
                dir.path().join("CMakeLists.txt"),
                dir.path().join("source/CMakeLists.txt"),
                dir.path().join("source/tests/CMakeLists.txt"),
            ]
        );
    }

    #[test]
    fn test_cpp_files_filter_extensions() {
        let (dir, ctx) = project();
        let files = cpp_files(&ctx);
        assert_eq!(
            files,
            vec![
                dir.path().join("source/Logger.cpp"),
                dir.path().join("include/NFLogger/Logger.h"),
            ]
        );
    }

    #[test]
    fn test_lint_cmake_checks_all_files_then_fails() {
        let (_dir, ctx) = project();
        let mut runner = RecordingRunner::new().fail("cmakelint", 4);
        let err = lint_cmake(&ctx, &mut runner).unwrap_err();
        assert_eq!(exit_code_for(&err), 4);
        assert_eq!(runner.commands.len(), 3);
    }

    #[test]
    fn test_lint_cpp_inline_uses_in_place_flag() {
        let (_dir, ctx) = project();
        let mut runner = RecordingRunner::new();
        lint_cpp(&ctx, true, &mut runner).unwrap();
        assert_eq!(runner.commands.len(), 2);
        assert!(runner
            .commands
            .iter()
            .all(|c| c.program == "clang-format" && c.args_lossy()[0] == "-i"));
    }

    #[test]
    fn test_lint_cpp_detects_unformatted_file() {
        let (_dir, ctx) = project();
        let mut runner = RecordingRunner::new().output("clang-format", "int x;\n");
        // Logger.cpp matches the formatted output, Logger.h does not
        let err = lint_cpp(&ctx, false, &mut runner).unwrap_err();
        assert_eq!(exit_code_for(&err), 1);
        assert_eq!(runner.commands.len(), 2);
    }

    #[test]
    fn test_lint_cpp_passes_when_formatted() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("source")).unwrap();
        std::fs::write(dir.path().join("source/a.cpp"), "int a;\n").unwrap();
        let ctx = BuildContext::new(dir.path().to_path_buf(), NfBuildConfig::default(), false);

        let mut runner = RecordingRunner::new().output("clang-format", "int a;\n");
        lint_cpp(&ctx, false, &mut runner).unwrap();
    }
}
