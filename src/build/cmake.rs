//! CMake project generation
//!
//! This module builds the cmake configure invocation. cmake runs inside the
//! build directory with the project root as its source directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::exec::{CommandRunner, ToolCommand};

/// CMake build type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
}

impl BuildType {
    pub fn is_release(&self) -> bool {
        matches!(self, BuildType::Release)
    }
}

impl std::fmt::Display for BuildType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildType::Debug => write!(f, "Debug"),
            BuildType::Release => write!(f, "Release"),
        }
    }
}

/// CMake configuration builder
#[derive(Debug, Default)]
pub struct CMakeConfig {
    /// cmake executable
    program: String,
    /// Source directory (where CMakeLists.txt is located)
    source_dir: PathBuf,
    /// Build directory, also the working directory
    build_dir: PathBuf,
    /// Generator (e.g., "Ninja", "Xcode")
    generator: Option<String>,
    /// CMake variables (-D options)
    variables: Vec<(String, String)>,
    /// Environment for the cmake child only
    env: Vec<(String, String)>,
}

impl CMakeConfig {
    /// Create a new CMake configuration
    pub fn new(program: impl Into<String>, source_dir: PathBuf, build_dir: PathBuf) -> Self {
        Self {
            program: program.into(),
            source_dir,
            build_dir,
            ..Default::default()
        }
    }

    /// Set the generator
    pub fn generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = Some(generator.into());
        self
    }

    /// Set a CMake variable
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push((name.into(), value.into()));
        self
    }

    /// Set an environment variable for the cmake process
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// The configure invocation
    pub fn command(&self) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.program)
            .arg(&self.source_dir)
            .current_dir(&self.build_dir);

        if let Some(generator) = &self.generator {
            cmd = cmd.arg(format!("-G{}", generator));
        }

        for (name, value) in &self.variables {
            cmd = cmd.arg(format!("-D{}={}", name, value));
        }

        for (key, value) in &self.env {
            cmd = cmd.env(key, value);
        }

        cmd
    }

    /// Run CMake configure step
    pub fn configure(&self, runner: &mut dyn CommandRunner) -> Result<()> {
        // Create build directory if it doesn't exist
        std::fs::create_dir_all(&self.build_dir)
            .context("Failed to create CMake build directory")?;

        runner
            .run(&self.command())
            .context("Failed to run CMake configure")?
            .check(&self.program)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::recording::RecordingRunner;

    #[test]
    fn test_command_layout() {
        let cmd = CMakeConfig::new("cmake", PathBuf::from("/src"), PathBuf::from("/src/build"))
            .generator("Ninja")
            .variable("CREATE_RELEASE_BUILD", "1")
            .env("CC", "gcc")
            .command();

        assert_eq!(cmd.program, "cmake");
        assert_eq!(
            cmd.args_lossy(),
            vec!["/src", "-GNinja", "-DCREATE_RELEASE_BUILD=1"]
        );
        assert_eq!(cmd.cwd, Some(PathBuf::from("/src/build")));
        assert_eq!(cmd.env_value("CC"), Some("gcc"));
    }

    #[test]
    fn test_configure_propagates_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let build_dir = dir.path().join("build");
        let mut runner = RecordingRunner::new().fail("cmake", 9);
        let err = CMakeConfig::new("cmake", dir.path().to_path_buf(), build_dir.clone())
            .configure(&mut runner)
            .unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 9);
        assert!(build_dir.is_dir());
    }

    #[test]
    fn test_build_type_display() {
        assert_eq!(BuildType::Debug.to_string(), "Debug");
        assert_eq!(BuildType::default().to_string(), "Release");
        assert!(BuildType::Release.is_release());
    }
}
