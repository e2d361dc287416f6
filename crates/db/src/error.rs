use menuprint_core::error::CoreError;

/// Error returned by multi-step persistence operations.
///
/// Domain failures (not found, exhausted numbering retries) travel as
/// [`CoreError`]; anything the driver reports stays a raw `sqlx::Error` so
/// the HTTP layer can classify it.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Whether `err` is a unique-constraint violation on the named constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    is_violation(err, UNIQUE_VIOLATION, constraint)
}

/// Whether `err` is a foreign-key violation on the named constraint.
pub fn is_foreign_key_violation(err: &sqlx::Error, constraint: &str) -> bool {
    is_violation(err, FOREIGN_KEY_VIOLATION, constraint)
}

fn is_violation(err: &sqlx::Error, sqlstate: &str, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(sqlstate) && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
