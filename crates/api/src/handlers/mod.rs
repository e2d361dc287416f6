//! Request handlers.
//!
//! - [`auth`] -- self-registration and token issuance (public).
//! - [`templates`] -- template and version operations (bearer token required).

pub mod auth;
pub mod templates;
