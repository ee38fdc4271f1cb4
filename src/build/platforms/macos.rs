//! macOS platform
//!
//! Generates an Xcode project with CMake and builds targets with xcodebuild.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::build::cmake::CMakeConfig;
use crate::build::{
    BinaryLocator, BuildContext, PlatformAdapter, ProjectGenerator, TargetBuilder,
};
use crate::exec::{CommandRunner, ToolCommand};
use crate::options::BuildOptions;

/// Register the macOS options and workflows
pub fn register(options: &mut BuildOptions) -> Result<()> {
    options.add_option("debug", "Enable Debug Mode")?;

    options.add_option("lintCmake", "Lint cmake files")?;
    options.add_option("lintCpp", "Lint CPP Files")?;
    options.add_option("lintCppWithInlineChange", "Lint CPP Files and fix them")?;

    options.add_option("unitTests", "Run Unit Tests")?;

    options.add_option("makeBuildDirectory", "Wipe existing build directory")?;
    options.add_option("generateProject", "Regenerate xcode project")?;

    options.add_option("buildTargetLibrary", "Build Target: Library")?;

    options.set_default_workflow("Empty workflow", &[])?;

    options.add_workflow(
        "lint",
        "Run lint workflow",
        &["debug", "lintCmake", "lintCppWithInlineChange"],
    )?;
    options.add_workflow(
        "build",
        "Production Build",
        &[
            "debug",
            "lintCmake",
            "lintCpp",
            "makeBuildDirectory",
            "generateProject",
            "buildTargetLibrary",
            "unitTests",
        ],
    )?;
    Ok(())
}

/// macOS adapter: CMake + Xcode
#[derive(Debug, Default)]
pub struct MacosAdapter;

impl MacosAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ProjectGenerator for MacosAdapter {
    fn generator(&self) -> &str {
        "Xcode"
    }

    fn generate_project(&self, ctx: &BuildContext, runner: &mut dyn CommandRunner) -> Result<()> {
        CMakeConfig::new(
            &ctx.config.tools.cmake,
            ctx.project_root.clone(),
            ctx.build_dir.clone(),
        )
        .generator(self.generator())
        .configure(runner)
    }
}

impl TargetBuilder for MacosAdapter {
    fn project_file(&self, ctx: &BuildContext) -> PathBuf {
        ctx.build_dir
            .join(format!("{}.xcodeproj", ctx.config.project_name))
    }

    fn build_target(
        &self,
        ctx: &BuildContext,
        target: &str,
        runner: &mut dyn CommandRunner,
    ) -> Result<()> {
        let xcodebuild = &ctx.config.tools.xcodebuild;
        let cmd = ToolCommand::new(xcodebuild)
            .arg("-project")
            .arg(self.project_file(ctx))
            .args(["-target", target])
            .args(["-sdk", ctx.config.macos.sdk.as_str()])
            .args(["-arch", ctx.config.macos.arch.as_str()])
            .arg("-configuration")
            .arg(ctx.build_type.to_string())
            .arg("build");

        runner
            .run(&cmd)
            .with_context(|| format!("Failed to build target {}", target))?
            .check(xcodebuild)?;
        Ok(())
    }
}

impl BinaryLocator for MacosAdapter {}

impl PlatformAdapter for MacosAdapter {
    fn platform_name(&self) -> &str {
        "macos"
    }
}
