//! Block store contract
//!
//! The stable guarantees of the chain allocator: roundtrips, capacity
//! behavior, failure atomicity and reclamation.
