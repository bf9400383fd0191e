//! # Contract Tests
//!
//! "Golden" tests pinning the observable contracts of the storage and
//! namespace subsystems, so they don't drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Contracts are written as code**: the guaranteed behaviors live here
//!   as executable scenarios, not in prose
//! - **Scenario fidelity**: tests use the reference geometries (8-byte
//!   blocks with 5-byte payloads, 10-block arenas) so the numbers in the
//!   scenarios stay recognizable
//! - **Whole-system checks**: the session contract module exercises the
//!   shell across real backing files and restarts

pub mod namespace;
pub mod session;
pub mod storage;
