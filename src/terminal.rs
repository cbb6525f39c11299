use std::io::{self, BufRead, Write};

use log::warn;

use crate::error::Result;
use crate::host::{self, Host, Severity};
use crate::output;

/// `Host` for the `clean` subcommand: questions on stdin, colored notices on
/// stdout, restart by spawning the configured command.
pub struct TerminalHost<R> {
    input: R,
    assume_yes: bool,
    restart_command: Option<Vec<String>>,
}

impl TerminalHost<io::StdinLock<'static>> {
    pub fn stdin(assume_yes: bool, restart_command: Option<Vec<String>>) -> Self {
        Self::new(io::stdin().lock(), assume_yes, restart_command)
    }
}

impl<R: BufRead> TerminalHost<R> {
    /// `restart_command` of `None` disables restarting altogether.
    pub fn new(input: R, assume_yes: bool, restart_command: Option<Vec<String>>) -> Self {
        Self {
            input,
            assume_yes,
            restart_command,
        }
    }

    fn read_answer(&mut self) -> io::Result<bool> {
        io::stdout().flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let answer = line.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

impl<R: BufRead> Host for TerminalHost<R> {
    fn confirm(&mut self, message: &str) -> bool {
        let (body, question) = match message.rsplit_once("\n\n") {
            Some((body, question)) => (body, question),
            None => ("", message),
        };
        if !body.is_empty() {
            output::print_message(body);
            println!();
        }

        if self.assume_yes {
            println!("{question} yes (--yes)");
            return true;
        }

        output::print_prompt(question);
        match self.read_answer() {
            Ok(yes) => yes,
            Err(e) => {
                warn!("could not read answer: {e}");
                false
            }
        }
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        output::print_notice(message, severity);
    }

    fn restart(&mut self) -> Result<()> {
        match &self.restart_command {
            Some(command) => host::relaunch(command),
            None => {
                output::print_notice("Restart skipped (--no-restart).", Severity::Info);
                Ok(())
            }
        }
    }

    fn restart_enabled(&self) -> bool {
        self.restart_command.is_some()
    }
}
