//! Build orchestration
//!
//! ```text
//! resolved options → steps::plan → Pipeline → PlatformAdapter → cmake/ninja/xcodebuild
//! ```
//!
//! ## Modules
//!
//! - `platforms` - Option registries and adapters for Linux and macOS
//! - `cmake` - CMake project generation
//! - `lint` - cmakelint and clang-format checks
//! - `discovery` - Locating built binaries
//! - `steps` - The ordered, fail-fast step pipeline

pub mod cmake;
pub mod discovery;
pub mod lint;
pub mod platforms;
pub mod steps;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::NfBuildConfig;
use crate::error::{hints, NfBuildError};
use crate::exec::CommandRunner;
use cmake::BuildType;

/// Compiler pair selected for a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Toolchain {
    /// Whatever cmake finds on its own
    #[default]
    Default,
    /// gcc/g++ with libstdc++
    Gnu,
    /// clang/clang++ with libc++
    Llvm,
}

impl Toolchain {
    /// `CC`/`CXX` values for the cmake child process
    pub fn compiler_env(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Toolchain::Default => None,
            Toolchain::Gnu => Some(("gcc", "g++")),
            Toolchain::Llvm => Some(("clang", "clang++")),
        }
    }

    /// Whether the project should link against libc++
    pub fn uses_llvm_stdlib(&self) -> bool {
        !matches!(self, Toolchain::Gnu)
    }
}

impl std::fmt::Display for Toolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Toolchain::Default => write!(f, "default"),
            Toolchain::Gnu => write!(f, "gcc"),
            Toolchain::Llvm => write!(f, "clang"),
        }
    }
}

/// Sanitizers requested for project generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sanitizers {
    pub address: bool,
    pub undefined_behaviour: bool,
}

/// Mutable per-run state consumed by build steps
#[derive(Debug)]
pub struct BuildContext {
    /// Project root directory (cmake source directory)
    pub project_root: PathBuf,
    /// Loaded configuration
    pub config: NfBuildConfig,
    /// Absolute build directory
    pub build_dir: PathBuf,
    pub build_type: BuildType,
    pub toolchain: Toolchain,
    pub sanitizers: Sanitizers,
    pub verbose: bool,
}

impl BuildContext {
    /// Create a new build context
    pub fn new(project_root: PathBuf, config: NfBuildConfig, verbose: bool) -> Self {
        let build_dir = project_root.join(&config.build_directory);
        let build_type = config.build_type;

        Self {
            project_root,
            config,
            build_dir,
            build_type,
            toolchain: Toolchain::Default,
            sanitizers: Sanitizers::default(),
            verbose,
        }
    }

    /// Target built by `buildTargetLibrary`
    pub fn library_target(&self) -> &str {
        &self.config.library_target
    }

    /// Output directory inside the build directory
    pub fn output_dir(&self) -> PathBuf {
        self.build_dir.join("output")
    }

    /// Wipe the build directory and create it again
    ///
    /// Refuses to touch a build directory that is the project root or one of
    /// its ancestors.
    pub fn make_build_directory(&self) -> Result<()> {
        if self.build_dir.exists() {
            self.ensure_build_dir_is_disposable()?;
            std::fs::remove_dir_all(&self.build_dir).with_context(|| {
                format!(
                    "Failed to remove build directory {}",
                    self.build_dir.display()
                )
            })?;
        }
        let output_dir = self.output_dir();
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        Ok(())
    }

    fn ensure_build_dir_is_disposable(&self) -> Result<()> {
        let build_dir = self.build_dir.canonicalize().with_context(|| {
            format!("Failed to resolve build directory {}", self.build_dir.display())
        })?;
        let project_root = self
            .project_root
            .canonicalize()
            .unwrap_or_else(|_| self.project_root.clone());

        if project_root.starts_with(&build_dir) {
            return Err(NfBuildError::config_error_with_hint(
                format!(
                    "build_directory {} contains the project root, refusing to remove it",
                    self.build_dir.display()
                ),
                hints::invalid_config(),
            )
            .into());
        }
        Ok(())
    }
}

/// Generates build files for a platform's build driver
pub trait ProjectGenerator {
    /// Generator name passed to cmake (`-G`)
    fn generator(&self) -> &str;

    fn generate_project(&self, ctx: &BuildContext, runner: &mut dyn CommandRunner) -> Result<()>;
}

/// Builds a named target with the platform's build driver
pub trait TargetBuilder {
    /// Generated project file the driver consumes
    fn project_file(&self, ctx: &BuildContext) -> PathBuf;

    fn build_target(
        &self,
        ctx: &BuildContext,
        target: &str,
        runner: &mut dyn CommandRunner,
    ) -> Result<()>;
}

/// Finds built binaries inside the build directory
pub trait BinaryLocator {
    fn target_binary(&self, ctx: &BuildContext, target: &str) -> Result<PathBuf> {
        discovery::find_target_binary(&ctx.build_dir, target)
    }
}

/// Everything a platform must provide to run the pipeline
pub trait PlatformAdapter: ProjectGenerator + TargetBuilder + BinaryLocator {
    fn platform_name(&self) -> &str;
}
