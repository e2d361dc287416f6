//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and patches
//! - `Serialize` projections returned by the service layer

pub mod template;
pub mod template_version;
pub mod user;
