//! Build step planning and execution
//!
//! The resolved option set is turned into an ordered list of steps. The order
//! is fixed here and does not depend on workflow order. The pipeline stops at
//! the first failing step and surfaces its error, whose exit code is the
//! failing tool's.

use anyhow::{Context, Result};

use super::cmake::BuildType;
use super::{lint, BuildContext, PlatformAdapter, Sanitizers, Toolchain};
use crate::error::NfBuildError;
use crate::exec::{CommandRunner, ToolCommand};
use crate::options::{BuildOptions, ResolvedOptions};
use crate::utils::terminal::print_info;

/// A single build step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    LintCmake,
    LintCpp { make_inline_changes: bool },
    MakeBuildDirectory,
    GenerateProject,
    BuildTarget { target: String },
    RunUnitTests,
}

impl Step {
    /// Option name that enables this step
    pub fn name(&self) -> &'static str {
        match self {
            Step::LintCmake => "lintCmake",
            Step::LintCpp {
                make_inline_changes: true,
            } => "lintCppWithInlineChange",
            Step::LintCpp {
                make_inline_changes: false,
            } => "lintCpp",
            Step::MakeBuildDirectory => "makeBuildDirectory",
            Step::GenerateProject => "generateProject",
            Step::BuildTarget { .. } => "buildTargetLibrary",
            Step::RunUnitTests => "unitTests",
        }
    }

    fn run(
        &self,
        ctx: &BuildContext,
        adapter: &dyn PlatformAdapter,
        runner: &mut dyn CommandRunner,
    ) -> Result<()> {
        match self {
            Step::LintCmake => lint::lint_cmake(ctx, runner),
            Step::LintCpp {
                make_inline_changes,
            } => lint::lint_cpp(ctx, *make_inline_changes, runner),
            Step::MakeBuildDirectory => ctx.make_build_directory(),
            Step::GenerateProject => adapter.generate_project(ctx, runner),
            Step::BuildTarget { target } => adapter.build_target(ctx, target, runner),
            Step::RunUnitTests => run_unit_tests(ctx, adapter, runner),
        }
    }
}

/// Apply context-only options and list the steps to run
///
/// `debug`, the toolchain options and the sanitizer options only change the
/// build context; every other enabled option becomes a step.
pub fn plan(
    registry: &BuildOptions,
    resolved: &ResolvedOptions,
    ctx: &mut BuildContext,
) -> Vec<Step> {
    let enabled = |name: &str| registry.check_option(resolved, name);

    if enabled("debug") {
        ctx.build_type = BuildType::Debug;
    }

    ctx.toolchain = if enabled("gnuToolchain") {
        Toolchain::Gnu
    } else if enabled("llvmToolchain") {
        Toolchain::Llvm
    } else {
        Toolchain::Default
    };

    ctx.sanitizers = Sanitizers {
        address: enabled("addressSanitizer"),
        undefined_behaviour: enabled("ubSanitizer"),
    };

    let mut steps = Vec::new();

    if enabled("lintCmake") {
        steps.push(Step::LintCmake);
    }

    if enabled("lintCppWithInlineChange") {
        steps.push(Step::LintCpp {
            make_inline_changes: true,
        });
    } else if enabled("lintCpp") {
        steps.push(Step::LintCpp {
            make_inline_changes: false,
        });
    }

    if enabled("makeBuildDirectory") {
        steps.push(Step::MakeBuildDirectory);
    }

    if enabled("generateProject") {
        steps.push(Step::GenerateProject);
    }

    if enabled("buildTargetLibrary") {
        steps.push(Step::BuildTarget {
            target: ctx.library_target().to_string(),
        });
    }

    if enabled("unitTests") {
        steps.push(Step::RunUnitTests);
    }

    steps
}

/// Locate and run every configured unit test binary
fn run_unit_tests(
    ctx: &BuildContext,
    adapter: &dyn PlatformAdapter,
    runner: &mut dyn CommandRunner,
) -> Result<()> {
    for unit_test in &ctx.config.unit_tests {
        print_info(&format!("Running unit test: {}", unit_test));
        let binary = adapter.target_binary(ctx, unit_test)?;
        let program = binary.display().to_string();

        runner
            .run(&ToolCommand::new(&program).current_dir(&ctx.project_root))
            .with_context(|| format!("Failed to run unit test {}", unit_test))?
            .check(unit_test)?;
    }
    Ok(())
}

/// Ordered, fail-fast list of steps
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step in order, halting at the first failure
    pub fn run(
        &self,
        ctx: &BuildContext,
        adapter: &dyn PlatformAdapter,
        runner: &mut dyn CommandRunner,
    ) -> Result<()> {
        for step in &self.steps {
            print_info(&format!("[{}] {}", adapter.platform_name(), step.name()));
            step.run(ctx, adapter, runner).map_err(|err| {
                if err.downcast_ref::<NfBuildError>().is_some() {
                    err
                } else {
                    err.context(format!("Step {} failed", step.name()))
                }
            })?;
        }
        Ok(())
    }
}
