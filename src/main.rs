//! nfbuild - CI build orchestration for NFLogger
//!
//! Resolves workflow and option flags, then drives cmake, ninja/xcodebuild,
//! cmakelint and clang-format to lint, configure, build and test the library.
//!
//! ## Architecture
//!
//! ```text
//! args → cli (registry per platform) → resolved options → build::steps → PlatformAdapter → tools
//! ```
//!
//! The exit code is 0 on success, otherwise the exit code of the first
//! failing tool.

mod build;
mod cli;
mod config;
mod error;
mod exec;
mod options;
mod utils;

use std::ffi::OsString;

use anyhow::{Context, Result};

use build::steps::{self, Pipeline};
use build::BuildContext;
use config::NfBuildConfig;
use error::{exit_code_for, NfBuildError};
use exec::SystemRunner;
use utils::terminal;

fn main() {
    let code = match run() {
        Ok(()) => 0,
        Err(err) => {
            report(&err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let args: Vec<OsString> = std::env::args_os().collect();

    let platform = cli::detect_platform(&args);
    let registry = platform.registry()?;
    let invocation = cli::parse(platform, &registry, args)?;

    if invocation.no_color {
        terminal::disable_colors();
    }

    if invocation.verbose {
        println!(
            "Platform: {}, workflow: {}",
            invocation.platform,
            invocation.workflow.as_deref().unwrap_or("(default)")
        );
    }
    invocation
        .resolved
        .verbose_print_build_options(invocation.verbose, &mut std::io::stdout())?;

    let project_root = std::env::current_dir().context("Failed to get current directory")?;
    let config = NfBuildConfig::load(&project_root, invocation.config.as_deref())?;
    let mut ctx = BuildContext::new(project_root, config, invocation.verbose);

    let pipeline = Pipeline::new(steps::plan(&registry, &invocation.resolved, &mut ctx));
    if pipeline.steps().is_empty() {
        terminal::print_info("Nothing to do");
        return Ok(());
    }

    let adapter = invocation.platform.adapter();
    let mut runner = SystemRunner::new(invocation.verbose);
    pipeline.run(&ctx, adapter.as_ref(), &mut runner)?;

    terminal::print_success(&format!(
        "{} step(s) completed for {}",
        pipeline.steps().len(),
        invocation.platform
    ));
    Ok(())
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<NfBuildError>() {
        Some(nf_err) => nf_err.display_with_hints(),
        None => terminal::print_error(&format!("{:#}", err)),
    }
}
