//! External process execution

mod subprocess;

pub use subprocess::{CommandRunner, SystemRunner, ToolCommand};

/// Test double that records commands instead of spawning them
#[cfg(test)]
pub mod recording {
    use std::collections::HashMap;

    use anyhow::Result;

    use super::subprocess::CommandResult;
    use super::{CommandRunner, ToolCommand};

    /// Records every command and answers with scripted results per program
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        pub commands: Vec<ToolCommand>,
        exit_codes: HashMap<String, i32>,
        stdout: HashMap<String, String>,
    }

    impl RecordingRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every invocation of `program` exit with `code`
        pub fn fail(mut self, program: &str, code: i32) -> Self {
            self.exit_codes.insert(program.to_string(), code);
            self
        }

        /// Make captured invocations of `program` print `stdout`
        pub fn output(mut self, program: &str, stdout: &str) -> Self {
            self.stdout.insert(program.to_string(), stdout.to_string());
            self
        }

        /// Programs invoked, in order
        pub fn programs(&self) -> Vec<&str> {
            self.commands.iter().map(|c| c.program.as_str()).collect()
        }

        fn answer(&mut self, command: &ToolCommand) -> CommandResult {
            self.commands.push(command.clone());
            let code = self.exit_codes.get(&command.program).copied().unwrap_or(0);
            let mut result = CommandResult::from_code(code);
            if let Some(stdout) = self.stdout.get(&command.program) {
                result.stdout = stdout.clone();
            }
            result
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&mut self, command: &ToolCommand) -> Result<CommandResult> {
            Ok(self.answer(command))
        }

        fn capture(&mut self, command: &ToolCommand) -> Result<CommandResult> {
            Ok(self.answer(command))
        }
    }
}
