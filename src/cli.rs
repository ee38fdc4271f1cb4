//! Command-line parsing
//!
//! The option flags are not known at compile time: every registered option
//! becomes a `--<name>` switch, and registered workflows are the accepted
//! values of the positional argument. The clap command is therefore built
//! from the registry with the builder API.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, Command};

use crate::build::platforms::Platform;
use crate::error::NfBuildError;
use crate::options::{BuildOptions, ResolvedOptions};

/// Environment variable selecting the platform
pub const PLATFORM_ENV: &str = "NFBUILD_PLATFORM";

/// Argument ids used by nfbuild itself; options may not reuse them
const RESERVED: &[&str] = &["workflow", "verbose", "platform", "config", "no-color", "help", "version"];

/// Everything parsed from one command line
#[derive(Debug)]
pub struct Invocation {
    pub platform: Platform,
    pub workflow: Option<String>,
    pub resolved: ResolvedOptions,
    pub config: Option<PathBuf>,
    pub verbose: bool,
    pub no_color: bool,
}

/// Pick the platform before the full parse, since it decides the registry
///
/// Looks at `--platform` in `args`, then `NFBUILD_PLATFORM`, then the host.
/// Unparseable values fall through here and are reported by clap later.
pub fn detect_platform(args: &[OsString]) -> Platform {
    let mut iter = args.iter().skip(1).filter_map(|a| a.to_str());
    while let Some(arg) = iter.next() {
        let value = if let Some(value) = arg.strip_prefix("--platform=") {
            Some(value)
        } else if arg == "--platform" {
            iter.next()
        } else {
            None
        };
        if let Some(platform) = value.and_then(Platform::from_name) {
            return platform;
        }
    }

    std::env::var(PLATFORM_ENV)
        .ok()
        .and_then(|name| Platform::from_name(&name))
        .unwrap_or_else(Platform::host)
}

/// Build the clap command for a registry
pub fn command(platform: Platform, registry: &BuildOptions) -> Result<Command> {
    let workflows: Vec<String> = registry.workflows().iter().map(|w| w.name.clone()).collect();

    let mut cmd = Command::new("nfbuild")
        .about(format!("Lint, build and test NFLogger ({})", platform))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(registry.usage_summary())
        .args_override_self(true)
        .arg(
            Arg::new("workflow")
                .value_name("WORKFLOW")
                .help("Workflow to run; the default workflow when omitted")
                .value_parser(clap::builder::PossibleValuesParser::new(workflows)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print resolved options and commands")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("platform")
                .long("platform")
                .env(PLATFORM_ENV)
                .ignore_case(true)
                .help("Platform to build for (defaults to the host)")
                .value_parser(value_parser!(Platform)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Configuration file (defaults to nfbuild.toml)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue),
        );

    for option in registry.options() {
        if RESERVED.contains(&option.name.as_str()) {
            return Err(NfBuildError::config_error(format!(
                "Option '{}' clashes with a built-in argument",
                option.name
            ))
            .into());
        }
        cmd = cmd.arg(
            Arg::new(option.name.clone())
                .long(option.name.clone())
                .help(option.description.clone())
                .action(ArgAction::SetTrue),
        );
    }

    Ok(cmd)
}

/// Parse `args` (including the program name) against the registry
///
/// `--help` and `--version` print and exit. Any other clap error becomes a
/// usage error listing every workflow and option.
pub fn parse<I, T>(platform: Platform, registry: &BuildOptions, args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match command(platform, registry)?.try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let rendered = err.render().to_string();
                let message = rendered
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .trim_start_matches("error: ")
                    .to_string();
                return Err(NfBuildError::usage_error(message, registry.usage_summary()).into());
            }
        },
    };

    let workflow = matches.get_one::<String>("workflow").cloned();
    let flags: Vec<&str> = registry
        .options()
        .iter()
        .map(|o| o.name.as_str())
        .filter(|name| matches.get_flag(name))
        .collect();
    let resolved = registry.resolve(workflow.as_deref(), &flags)?;

    Ok(Invocation {
        platform: matches
            .get_one::<Platform>("platform")
            .copied()
            .unwrap_or(platform),
        workflow,
        resolved,
        config: matches.get_one::<PathBuf>("config").cloned(),
        verbose: matches.get_flag("verbose"),
        no_color: matches.get_flag("no-color"),
    })
}
