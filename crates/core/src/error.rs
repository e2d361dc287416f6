use crate::types::DbId;

/// Domain-level error shared by the persistence and HTTP layers.
///
/// `NotFound` deliberately covers both "does not exist" and "owned by someone
/// else"; callers must never be able to tell the two apart.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Could not allocate a version number for template {template_id} after {attempts} attempts")]
    NumberingRaceExhausted { template_id: DbId, attempts: u32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for the not-found error returned by every template lookup.
    pub fn template_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: "Template",
            id,
        }
    }

    /// Shorthand for a missing version inside an accessible template.
    pub fn version_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: "TemplateVersion",
            id,
        }
    }
}
