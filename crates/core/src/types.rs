/// All primary keys are PostgreSQL `UUID` columns defaulting to `gen_random_uuid()`.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
