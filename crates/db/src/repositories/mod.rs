//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads take
//! `&PgPool`; writes that must share a transaction with other steps take
//! `&mut PgConnection` (pass `&mut *tx`).

pub mod template_repo;
pub mod template_version_repo;
pub mod user_repo;

pub use template_repo::TemplateRepo;
pub use template_version_repo::TemplateVersionRepo;
pub use user_repo::UserRepo;
