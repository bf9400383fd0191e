//! The interactive read-eval loop
//!
//! Reads one line at a time, tokenizes on whitespace, dispatches, prints
//! the returned lines and performs the persistence writes the command's
//! outcome flags ask for. One command is fully processed before the next
//! line is read.

use crate::commands::dispatch;
use crate::session::Session;
use std::io::{BufRead, Write};
use syslog::{LogEntry, LogLevel};

/// The interactive loop over a session
pub struct Repl {
    session: Session,
}

impl Repl {
    /// Wraps a started session
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Returns the wrapped session
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Runs until `exit`/`quit` or end of input
    ///
    /// Generic over the streams so tests can drive the loop from strings.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> std::io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(output, "{} >> ", self.session.current_path())?;
            output.flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            if !self.step(&line, &mut output)? {
                break;
            }
        }
        Ok(())
    }

    /// Processes one input line; false means the session should end
    pub fn step(&mut self, line: &str, output: &mut impl Write) -> std::io::Result<bool> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (name, args) = match tokens.split_first() {
            Some((&name, args)) => (name, args),
            None => ("", &[][..]),
        };

        let (outcome, lines) = dispatch(&mut self.session, name, args);
        for line in lines {
            writeln!(output, "{}", line)?;
        }

        if outcome.persist_namespace {
            if let Err(e) = self.session.persist_namespace() {
                let entry = LogEntry::new(LogLevel::Error, format!("Save failed: {}", e));
                writeln!(output, "{}", entry.render())?;
            }
        }
        if outcome.persist_settings {
            if let Err(e) = self.session.persist_settings() {
                let entry = LogEntry::new(LogLevel::Error, format!("Save failed: {}", e));
                writeln!(output, "{}", entry.render())?;
            }
        }

        Ok(outcome.continue_session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionPaths;
    use block_store::Geometry;
    use hal::{FixedClock, FixedPointer};
    use tempfile::tempdir;

    fn repl_in(dir: &std::path::Path) -> Repl {
        let session = Session::start(
            SessionPaths::in_dir(dir),
            Geometry::new(8, 32).unwrap(),
            Box::new(FixedClock::new(1_000)),
            Box::new(FixedPointer::new(3, 4)),
        )
        .unwrap();
        Repl::new(session)
    }

    #[test]
    fn test_loop_runs_script_and_exits() {
        let dir = tempdir().unwrap();
        let mut repl = repl_in(dir.path());
        let script = "mkdir sub\ncd sub\ntouch a\nwrite a hi\ncat a\nexit\n";
        let mut output = Vec::new();

        repl.run(script.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("/ >> "));
        assert!(text.contains("/sub/ >> "));
        assert!(text.contains("hi"));
    }

    #[test]
    fn test_loop_ends_at_end_of_input() {
        let dir = tempdir().unwrap();
        let mut repl = repl_in(dir.path());
        let mut output = Vec::new();

        repl.run("ls\n".as_bytes(), &mut output).unwrap();
    }

    #[test]
    fn test_step_persists_after_mutation() {
        let dir = tempdir().unwrap();
        let mut repl = repl_in(dir.path());
        let mut output = Vec::new();

        assert!(repl.step("mkdir kept", &mut output).unwrap());
        drop(repl);

        // A fresh session sees the directory without an explicit save
        let mut repl = repl_in(dir.path());
        let mut output = Vec::new();
        repl.step("cd kept", &mut output).unwrap();
        assert_eq!(repl.session.current_path(), "/kept/");
    }

    #[test]
    fn test_step_reports_errors_and_continues() {
        let dir = tempdir().unwrap();
        let mut repl = repl_in(dir.path());
        let mut output = Vec::new();

        assert!(repl.step("nonsense", &mut output).unwrap());
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("[ERROR]"));
        assert!(text.contains("nonsense"));
    }

    #[test]
    fn test_exit_stops_the_loop() {
        let dir = tempdir().unwrap();
        let mut repl = repl_in(dir.path());
        let mut output = Vec::new();

        assert!(!repl.step("exit", &mut output).unwrap());
    }
}
