//! Domain building blocks for the menuprint template service.
//!
//! This crate has no I/O. It holds the shared id/timestamp aliases, the
//! [`error::CoreError`] taxonomy, input validation for templates and users,
//! and the version-numbering rules the storage layer relies on.

pub mod error;
pub mod template;
pub mod types;
pub mod user;
pub mod versioning;
