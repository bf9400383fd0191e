//! Scripted walk-through of the filesystem shell
//!
//! Runs a short command script against a session backed by temporary-style
//! files in the current directory, printing everything the interactive
//! shell would print.
//!
//! Run with: `cargo run --example fs_shell`

use block_store::Geometry;
use cli_console::{Repl, Session, SessionPaths};
use hal::{FixedPointer, SystemClock};
use std::io;
use std::path::Path;

fn main() -> io::Result<()> {
    let dir = Path::new(".");
    let session = Session::start(
        SessionPaths::in_dir(dir),
        Geometry::default(),
        Box::new(SystemClock),
        Box::new(FixedPointer::new(640, 480)),
    )
    .expect("session should start");

    let script = "\
mkdir home
cd home
touch notes
write notes block chains at work
cat notes
mkdev null zero
cat null
mkdev cursor pointer
cat cursor
ls
cd ..
exit
";

    let mut repl = Repl::new(session);
    repl.run(script.as_bytes(), io::stdout())
}
