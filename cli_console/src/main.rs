//! BlockFS shell entry point

use block_store::Geometry;
use cli_console::{Repl, Session, SessionPaths};
use hal::{HostPointer, SystemClock};
use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

fn main() {
    let dir = match env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from("."),
    };

    println!("---------------------------------------------------------");
    println!("BlockFS - simulated filesystem shell");
    println!("---------------------------------------------------------");

    let session = Session::start(
        SessionPaths::in_dir(&dir),
        Geometry::default(),
        Box::new(SystemClock),
        Box::new(HostPointer),
    )
    .unwrap_or_else(|e| {
        eprintln!("Failed to start session: {}", e);
        process::exit(1);
    });

    let stdin = io::stdin();
    let mut repl = Repl::new(session);
    if let Err(e) = repl.run(stdin.lock(), io::stdout()) {
        eprintln!("Session error: {}", e);
        process::exit(1);
    }
}
