//! Session contract
//!
//! The collaborator boundary: `(command name, args)` in, outcome flags out,
//! with the flagged persistence writes restoring state across restarts.

#[cfg(test)]
mod tests {
    use block_store::Geometry;
    use cli_console::{dispatch, CommandOutcome, Session, SessionPaths};
    use hal::{FixedClock, FixedPointer};
    use tempfile::tempdir;

    fn start(dir: &std::path::Path) -> Session {
        Session::start(
            SessionPaths::in_dir(dir),
            Geometry::new(8, 32).unwrap(),
            Box::new(FixedClock::new(1_000)),
            Box::new(FixedPointer::new(0, 0)),
        )
        .unwrap()
    }

    fn run(session: &mut Session, line: &str) -> (CommandOutcome, Vec<String>) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.split_first() {
            Some((&name, args)) => dispatch(session, name, args),
            None => dispatch(session, "", &[]),
        }
    }

    #[test]
    fn outcome_flags_are_stable_per_command() {
        let dir = tempdir().unwrap();
        let mut session = start(dir.path());
        run(&mut session, "mkdir sub");
        run(&mut session, "touch file");

        // (command, continue, persist_namespace, persist_settings)
        let expectations = [
            ("ls", true, false, false),
            ("cat file", true, false, false),
            ("cd sub", true, false, true),
            ("cd ..", true, false, true),
            ("mkdir other", true, true, false),
            ("touch note", true, true, false),
            ("write note x", true, true, false),
            ("ap note y", true, true, false),
            ("cp note copy", true, true, false),
            ("mv copy moved", true, true, false),
            ("rm moved", true, true, false),
            ("rmdir other", true, true, false),
            ("mkdev null zero", true, true, false),
            ("", true, false, false),
            ("exit", false, false, false),
        ];

        for (command, cont, ns, settings) in expectations {
            let (outcome, _) = run(&mut session, command);
            assert_eq!(outcome.continue_session, cont, "{}", command);
            assert_eq!(outcome.persist_namespace, ns, "{}", command);
            assert_eq!(outcome.persist_settings, settings, "{}", command);
        }
    }

    #[test]
    fn errors_are_advisory_and_never_end_the_session() {
        let dir = tempdir().unwrap();
        let mut session = start(dir.path());

        let failing = [
            "cd nowhere",
            "cat nothing",
            "rm nothing",
            "mkdev d tape",
            "no_such_command",
            "mkdir",
        ];
        for command in failing {
            let (outcome, lines) = run(&mut session, command);
            assert!(outcome.continue_session, "{}", command);
            assert!(
                lines.iter().any(|l| l.contains("[ERROR]")),
                "{} should report an error",
                command
            );
        }
    }

    #[test]
    fn flagged_writes_restore_state_across_restarts() {
        let dir = tempdir().unwrap();
        {
            let mut session = start(dir.path());
            run(&mut session, "mkdir docs");
            run(&mut session, "touch docs/note");
            run(&mut session, "write docs/note kept across restart");
            run(&mut session, "cd docs");
            session.persist_namespace().unwrap();
            session.persist_settings().unwrap();
        }

        let mut session = start(dir.path());
        assert_eq!(session.current_path(), "/docs/");
        let (_, lines) = run(&mut session, "cat note");
        assert_eq!(lines, vec!["kept across restart".to_string()]);
    }
}
