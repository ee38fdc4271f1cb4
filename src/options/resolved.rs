//! The set of options enabled for one invocation

use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;

/// Enabled options after workflow expansion and flag overrides
///
/// Membership is all that matters; iteration is sorted only so output is
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    enabled: BTreeSet<String>,
}

impl ResolvedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable an option. Enabling twice is a no-op.
    pub fn insert(&mut self, name: &str) {
        self.enabled.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Enabled option names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.enabled.iter().map(String::as_str).collect()
    }

    /// Write the resolved set for diagnostics when `verbose` is set
    pub fn verbose_print_build_options<W: Write>(
        &self,
        verbose: bool,
        out: &mut W,
    ) -> std::io::Result<()> {
        if !verbose {
            return Ok(());
        }
        writeln!(out, "Options:")?;
        if self.enabled.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for name in &self.enabled {
            writeln!(out, "  {}", name)?;
        }
        Ok(())
    }
}

impl fmt::Display for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.names().join(", "))
    }
}

impl<'a> FromIterator<&'a str> for ResolvedOptions {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut resolved = Self::new();
        for name in iter {
            resolved.insert(name);
        }
        resolved
    }
}
