//! # CLI Console
//!
//! The interactive shell over the filesystem core: a session context that
//! owns every subsystem, a command dispatcher, and the read-eval loop.
//!
//! ## Design
//!
//! - **Explicit context, no globals**: [`Session`] is constructed once at
//!   startup and passed to every command. It owns the block store, the
//!   namespace, the settings and the host capabilities.
//! - **Commands are advisory**: every failure becomes a console message and
//!   the loop keeps reading; only `exit`/`quit` ends the session.
//! - **Persistence is flag-driven**: each command statically declares
//!   whether the namespace snapshot and/or the settings file should be
//!   rewritten after it runs; the loop performs the writes.

pub mod commands;
pub mod repl;
pub mod session;

pub use commands::{dispatch, CommandError, CommandOutcome};
pub use repl::Repl;
pub use session::{Session, SessionError, SessionPaths};
