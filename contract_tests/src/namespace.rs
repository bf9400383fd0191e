//! Namespace contract
//!
//! The stable guarantees of path resolution, the reserved back-references
//! and the file open/close lifecycle.
