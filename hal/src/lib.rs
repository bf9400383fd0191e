//! # Host Abstraction Layer
//!
//! Capability interfaces to the host machine.
//!
//! ## Philosophy
//!
//! The filesystem core never talks to the host directly. Anything that
//! depends on ambient host state (the wall clock, the cursor position)
//! is reached through a small trait held by the session, so every consumer
//! can be driven deterministically in tests.
//!
//! ## Design
//!
//! - **Clock**: monotonic-enough timestamps for node metadata
//! - **PointerSource**: the cursor position read by the pointer device
//!
//! Each trait ships a host-backed implementation and a fixed implementation
//! for tests.

pub mod clock;
pub mod pointer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use pointer::{FixedPointer, HostPointer, PointerError, PointerSource};
