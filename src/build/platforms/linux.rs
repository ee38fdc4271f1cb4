//! Linux platform
//!
//! Generates a Ninja project with CMake and builds targets with ninja. The
//! compiler pair is chosen per run (gcc or clang) and handed to cmake through
//! `CC`/`CXX` in the cmake child's environment.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::build::cmake::CMakeConfig;
use crate::build::{
    BinaryLocator, BuildContext, PlatformAdapter, ProjectGenerator, TargetBuilder,
};
use crate::exec::{CommandRunner, ToolCommand};
use crate::options::BuildOptions;

/// Generated Ninja build file
pub const PROJECT_FILE: &str = "build.ninja";

/// Register the Linux options and workflows
pub fn register(options: &mut BuildOptions) -> Result<()> {
    options.add_option("debug", "Enable Debug Mode")?;
    options.add_option("lintCmake", "Lint cmake files")?;
    options.add_option("lintCpp", "Lint CPP Files")?;
    options.add_option("lintCppWithInlineChange", "Lint CPP Files and fix them")?;
    options.add_option("makeBuildDirectory", "Wipe existing build directory")?;
    options.add_option("generateProject", "Regenerate ninja project")?;
    options.add_option("buildTargetLibrary", "Build Target: Library")?;
    options.add_option("gnuToolchain", "Build with gcc and libstdc++")?;
    options.add_option("llvmToolchain", "Build with clang and libc++")?;
    options.add_option("addressSanitizer", "Build with AddressSanitizer")?;
    options.add_option("ubSanitizer", "Build with UndefinedBehaviorSanitizer")?;
    options.add_option("unitTests", "Run Unit Tests")?;

    options.set_default_workflow("Empty workflow", &[])?;

    options.add_workflow(
        "lint",
        "Run lint workflow",
        &["lintCmake", "lintCppWithInlineChange"],
    )?;
    options.add_workflow(
        "clang_build",
        "Production Build",
        &[
            "llvmToolchain",
            "lintCmake",
            "makeBuildDirectory",
            "generateProject",
            "buildTargetLibrary",
            "unitTests",
        ],
    )?;
    options.add_workflow(
        "gcc_build",
        "Production Build",
        &[
            "gnuToolchain",
            "lintCmake",
            "makeBuildDirectory",
            "generateProject",
            "buildTargetLibrary",
            "unitTests",
        ],
    )?;
    Ok(())
}

/// Linux adapter: CMake + Ninja
#[derive(Debug, Default)]
pub struct LinuxAdapter;

impl LinuxAdapter {
    pub fn new() -> Self {
        Self
    }

    /// cmake configuration for the current context
    pub fn cmake_config(&self, ctx: &BuildContext) -> CMakeConfig {
        let flag = |on: bool| if on { "1" } else { "0" };

        let mut config = CMakeConfig::new(
            &ctx.config.tools.cmake,
            ctx.project_root.clone(),
            ctx.build_dir.clone(),
        )
        .generator(self.generator())
        .variable("CREATE_RELEASE_BUILD", flag(ctx.build_type.is_release()));

        if ctx.sanitizers.undefined_behaviour {
            config = config.variable("USE_UB_SANITIZER", "1");
        }
        if ctx.sanitizers.address {
            config = config.variable("USE_ADDRESS_SANITIZER", "1");
        }
        config = config.variable("LLVM_STDLIB", flag(ctx.toolchain.uses_llvm_stdlib()));

        if let Some((cc, cxx)) = ctx.toolchain.compiler_env() {
            config = config.env("CC", cc).env("CXX", cxx);
        }
        config
    }
}

impl ProjectGenerator for LinuxAdapter {
    fn generator(&self) -> &str {
        "Ninja"
    }

    fn generate_project(&self, ctx: &BuildContext, runner: &mut dyn CommandRunner) -> Result<()> {
        self.cmake_config(ctx).configure(runner)
    }
}

impl TargetBuilder for LinuxAdapter {
    fn project_file(&self, _ctx: &BuildContext) -> PathBuf {
        PathBuf::from(PROJECT_FILE)
    }

    fn build_target(
        &self,
        ctx: &BuildContext,
        target: &str,
        runner: &mut dyn CommandRunner,
    ) -> Result<()> {
        let ninja = &ctx.config.tools.ninja;
        let cmd = ToolCommand::new(ninja)
            .arg("-C")
            .arg(&ctx.build_dir)
            .arg("-f")
            .arg(self.project_file(ctx))
            .arg(target);

        runner
            .run(&cmd)
            .with_context(|| format!("Failed to build target {}", target))?
            .check(ninja)?;
        Ok(())
    }
}

impl BinaryLocator for LinuxAdapter {}

impl PlatformAdapter for LinuxAdapter {
    fn platform_name(&self) -> &str {
        "linux"
    }
}
