//! Option and workflow registry
//!
//! The registry is populated once at startup and is read-only afterwards.
//! Registration order is preserved so `--help` lists options the way the
//! entry point declared them.

use anyhow::Result;

use super::ResolvedOptions;
use crate::error::NfBuildError;

/// Name under which the default workflow is stored
pub const DEFAULT_WORKFLOW: &str = "default";

/// A single named boolean build option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOption {
    /// Unique option identifier, used as `--<name>`
    pub name: String,
    /// Human readable description
    pub description: String,
}

/// A named, ordered list of option identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub name: String,
    pub description: String,
    /// Order only matters for display
    pub options: Vec<String>,
}

/// Registry of options and workflows
#[derive(Debug, Default)]
pub struct BuildOptions {
    options: Vec<BuildOption>,
    workflows: Vec<Workflow>,
    default_workflow: Option<Workflow>,
}

impl BuildOptions {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a boolean option
    pub fn add_option(&mut self, name: &str, description: &str) -> Result<()> {
        if name.is_empty() {
            return Err(NfBuildError::config_error("Option name must not be empty").into());
        }
        if self.option(name).is_some() {
            return Err(
                NfBuildError::config_error(format!("Option '{}' is already registered", name))
                    .into(),
            );
        }

        self.options.push(BuildOption {
            name: name.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    /// Register a named workflow
    pub fn add_workflow(&mut self, name: &str, description: &str, options: &[&str]) -> Result<()> {
        if name.is_empty() || name == DEFAULT_WORKFLOW {
            return Err(NfBuildError::config_error(format!(
                "'{}' is not a valid workflow name",
                name
            ))
            .into());
        }
        if self.workflow(name).is_some() {
            return Err(NfBuildError::config_error(format!(
                "Workflow '{}' is already registered",
                name
            ))
            .into());
        }

        let workflow = self.checked_workflow(name, description, options)?;
        self.workflows.push(workflow);
        Ok(())
    }

    /// Register the workflow used when none is named on the command line
    pub fn set_default_workflow(&mut self, description: &str, options: &[&str]) -> Result<()> {
        if self.default_workflow.is_some() {
            return Err(
                NfBuildError::config_error("Default workflow is already registered").into(),
            );
        }

        let workflow = self.checked_workflow(DEFAULT_WORKFLOW, description, options)?;
        self.default_workflow = Some(workflow);
        Ok(())
    }

    fn checked_workflow(
        &self,
        name: &str,
        description: &str,
        options: &[&str],
    ) -> Result<Workflow> {
        if let Some(unknown) = options.iter().find(|o| self.option(o).is_none()) {
            return Err(NfBuildError::config_error(format!(
                "Workflow '{}' references unknown option '{}'",
                name, unknown
            ))
            .into());
        }

        Ok(Workflow {
            name: name.to_string(),
            description: description.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        })
    }

    /// Look up an option by name
    pub fn option(&self, name: &str) -> Option<&BuildOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Look up a named workflow
    pub fn workflow(&self, name: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.name == name)
    }

    /// All options in registration order
    pub fn options(&self) -> &[BuildOption] {
        &self.options
    }

    /// All named workflows in registration order
    pub fn workflows(&self) -> &[Workflow] {
        &self.workflows
    }

    /// The default workflow, if one was registered
    pub fn default_workflow(&self) -> Option<&Workflow> {
        self.default_workflow.as_ref()
    }

    /// Expand a workflow selection and direct flags into the enabled set
    ///
    /// `None` selects the default workflow. Flags are unioned on top of the
    /// workflow's options; duplicates collapse.
    pub fn resolve<S: AsRef<str>>(
        &self,
        workflow: Option<&str>,
        flags: &[S],
    ) -> Result<ResolvedOptions> {
        let selected = match workflow {
            Some(name) => Some(self.workflow(name).ok_or_else(|| {
                NfBuildError::usage_error(
                    format!("Unknown workflow '{}'", name),
                    self.usage_summary(),
                )
            })?),
            None => self.default_workflow(),
        };

        let mut resolved = ResolvedOptions::new();
        if let Some(workflow) = selected {
            for option in &workflow.options {
                resolved.insert(option);
            }
        }

        for flag in flags {
            let flag = flag.as_ref();
            if self.option(flag).is_none() {
                return Err(NfBuildError::usage_error(
                    format!("Unknown option '--{}'", flag),
                    self.usage_summary(),
                )
                .into());
            }
            resolved.insert(flag);
        }

        Ok(resolved)
    }

    /// Membership predicate for a resolved set
    pub fn check_option(&self, resolved: &ResolvedOptions, name: &str) -> bool {
        resolved.contains(name)
    }

    /// Text listing every registered workflow and option
    pub fn usage_summary(&self) -> String {
        let mut out = String::from("Workflows:\n");
        let width = self
            .workflows
            .iter()
            .map(|w| w.name.len())
            .chain(self.options.iter().map(|o| o.name.len() + 2))
            .max()
            .unwrap_or(0);

        if let Some(default) = &self.default_workflow {
            out.push_str(&format!(
                "  {:<width$}  {} [{}]\n",
                "(none)",
                default.description,
                default.options.join(", "),
                width = width
            ));
        }
        for workflow in &self.workflows {
            out.push_str(&format!(
                "  {:<width$}  {} [{}]\n",
                workflow.name,
                workflow.description,
                workflow.options.join(", "),
                width = width
            ));
        }

        out.push_str("\nOptions:\n");
        for option in &self.options {
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                format!("--{}", option.name),
                option.description,
                width = width
            ));
        }
        out
    }
}
