//! Repository for the `template_versions` table.
//!
//! Append-only: rows are inserted with the next version number and never
//! updated. The current version number is derived from `MAX(version)`; the
//! unique constraint on `(template_id, version)` rejects a second writer that
//! computed the same number, and [`TemplateVersionRepo::append`] retries it.

use menuprint_core::error::CoreError;
use menuprint_core::types::DbId;
use menuprint_core::versioning::{next_version_number, MAX_APPEND_ATTEMPTS};
use sqlx::{Connection, PgConnection, PgExecutor};

use crate::error::{is_unique_violation, ServiceError};
use crate::models::template_version::{TemplateVersion, TemplateVersionSummary};

/// Column list for full version rows.
const COLUMNS: &str = "id, template_id, version, data, created_at";

/// Column list for payload-free listings.
const SUMMARY_COLUMNS: &str = "id, version, created_at";

/// Unique constraint on `(template_id, version)`.
pub const VERSION_CONSTRAINT: &str = "uq_template_versions_template_version";

/// Provides append and read operations for template versions.
pub struct TemplateVersionRepo;

impl TemplateVersionRepo {
    /// Append a new version with number `MAX(version) + 1` (or 1 for an empty
    /// history), returning the created row.
    ///
    /// Must run inside a transaction. Each attempt runs in its own savepoint,
    /// so a unique violation from a racing writer only discards that attempt;
    /// the number is then recomputed. After [`MAX_APPEND_ATTEMPTS`] conflicts
    /// the append fails with [`CoreError::NumberingRaceExhausted`].
    pub async fn append(
        conn: &mut PgConnection,
        template_id: DbId,
        data: &serde_json::Value,
    ) -> Result<TemplateVersion, ServiceError> {
        let insert = format!(
            "INSERT INTO template_versions (template_id, version, data) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );

        for attempt in 1..=MAX_APPEND_ATTEMPTS {
            let mut savepoint = conn.begin().await?;

            let (current_max,): (Option<i32>,) =
                sqlx::query_as("SELECT MAX(version) FROM template_versions WHERE template_id = $1")
                    .bind(template_id)
                    .fetch_one(&mut *savepoint)
                    .await?;
            let next = next_version_number(current_max)?;

            let inserted = sqlx::query_as::<_, TemplateVersion>(&insert)
                .bind(template_id)
                .bind(next)
                .bind(data)
                .fetch_one(&mut *savepoint)
                .await;

            match inserted {
                Ok(version) => {
                    savepoint.commit().await?;
                    return Ok(version);
                }
                Err(err) if is_unique_violation(&err, VERSION_CONSTRAINT) => {
                    savepoint.rollback().await?;
                    tracing::warn!(
                        %template_id,
                        version = next,
                        attempt,
                        "Version number taken by a concurrent writer, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::error!(
            %template_id,
            attempts = MAX_APPEND_ATTEMPTS,
            "Exhausted version numbering retries"
        );
        Err(CoreError::NumberingRaceExhausted {
            template_id,
            attempts: MAX_APPEND_ATTEMPTS,
        }
        .into())
    }

    /// Summary of the highest-numbered version of a template.
    pub async fn latest<'e, E: PgExecutor<'e>>(
        executor: E,
        template_id: DbId,
    ) -> Result<Option<TemplateVersionSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM template_versions \
             WHERE template_id = $1 \
             ORDER BY version DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, TemplateVersionSummary>(&query)
            .bind(template_id)
            .fetch_optional(executor)
            .await
    }

    /// Full row (payload included) of the highest-numbered version.
    pub async fn latest_detail<'e, E: PgExecutor<'e>>(
        executor: E,
        template_id: DbId,
    ) -> Result<Option<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM template_versions \
             WHERE template_id = $1 \
             ORDER BY version DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(template_id)
            .fetch_optional(executor)
            .await
    }

    /// List version summaries for a template, ascending by version number.
    pub async fn list<'e, E: PgExecutor<'e>>(
        executor: E,
        template_id: DbId,
    ) -> Result<Vec<TemplateVersionSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM template_versions \
             WHERE template_id = $1 \
             ORDER BY version ASC"
        );
        sqlx::query_as::<_, TemplateVersionSummary>(&query)
            .bind(template_id)
            .fetch_all(executor)
            .await
    }

    /// Find a version by ID, only if it belongs to `template_id`.
    pub async fn find_in_template<'e, E: PgExecutor<'e>>(
        executor: E,
        template_id: DbId,
        version_id: DbId,
    ) -> Result<Option<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM template_versions \
             WHERE template_id = $1 AND id = $2"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(template_id)
            .bind(version_id)
            .fetch_optional(executor)
            .await
    }

    /// Version numbers of a template, ascending.
    pub async fn version_numbers<'e, E: PgExecutor<'e>>(
        executor: E,
        template_id: DbId,
    ) -> Result<Vec<i32>, sqlx::Error> {
        let rows: Vec<(i32,)> = sqlx::query_as(
            "SELECT version FROM template_versions WHERE template_id = $1 ORDER BY version ASC",
        )
        .bind(template_id)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    /// Delete every version of a template. Returns the number of rows removed.
    ///
    /// Only used as the first half of a template deletion.
    pub async fn delete_all(conn: &mut PgConnection, template_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM template_versions WHERE template_id = $1")
            .bind(template_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
