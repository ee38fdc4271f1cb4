//! Locating built binaries
//!
//! The build directory is walked recursively for regular files whose name
//! matches the target (as a glob). Xcode and multi-config generators can
//! leave several matches, so the winner is chosen deterministically: the
//! shallowest path, then the lexicographically smallest.

use std::path::{Path, PathBuf};

use anyhow::Result;
use glob::Pattern;
use walkdir::WalkDir;

use crate::error::NfBuildError;
use crate::utils::terminal::print_warning;

/// Every file under `build_dir` whose name matches `target`, best match first
pub fn find_candidates(build_dir: &Path, target: &str) -> Vec<PathBuf> {
    let Ok(pattern) =
        Pattern::new(target).or_else(|_| Pattern::new(&Pattern::escape(target)))
    else {
        return Vec::new();
    };

    let mut matches: Vec<PathBuf> = WalkDir::new(build_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|name| pattern.matches(name))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    matches.sort_by(|a, b| {
        a.components()
            .count()
            .cmp(&b.components().count())
            .then_with(|| a.cmp(b))
    });
    matches
}

/// Locate the binary for `target`, warning when the choice was ambiguous
pub fn find_target_binary(build_dir: &Path, target: &str) -> Result<PathBuf> {
    let mut candidates = find_candidates(build_dir, target);

    if candidates.len() > 1 {
        print_warning(&format!(
            "{} files match '{}', using {}",
            candidates.len(),
            target,
            candidates[0].display()
        ));
    }

    if candidates.is_empty() {
        return Err(NfBuildError::BinaryNotFound {
            target: target.to_string(),
            search_dir: build_dir.to_path_buf(),
        }
        .into());
    }

    Ok(candidates.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_finds_nested_binary() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "source/tests/NFLoggerTest");
        touch(dir.path(), "source/tests/NFLoggerTest.o.d");

        let found = find_target_binary(dir.path(), "NFLoggerTest").unwrap();
        assert_eq!(found, dir.path().join("source/tests/NFLoggerTest"));
    }

    #[test]
    fn test_prefers_shallowest_then_lexicographic() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b/deeper/NFLoggerTest");
        touch(dir.path(), "Release/NFLoggerTest");
        touch(dir.path(), "Debug/NFLoggerTest");

        let candidates = find_candidates(dir.path(), "NFLoggerTest");
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], dir.path().join("Debug/NFLoggerTest"));
        assert_eq!(candidates[2], dir.path().join("b/deeper/NFLoggerTest"));
    }

    #[test]
    fn test_directories_are_not_binaries() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("NFLoggerTest")).unwrap();

        let err = find_target_binary(dir.path(), "NFLoggerTest").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NfBuildError>(),
            Some(NfBuildError::BinaryNotFound { .. })
        ));
    }

    #[test]
    fn test_glob_target() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "bin/NFLoggerTest.exe");
        let found = find_target_binary(dir.path(), "NFLoggerTest*").unwrap();
        assert_eq!(found, dir.path().join("bin/NFLoggerTest.exe"));
    }

    #[test]
    fn test_missing_build_directory() {
        let dir = TempDir::new().unwrap();
        assert!(find_target_binary(&dir.path().join("missing"), "NFLoggerTest").is_err());
    }
}
