//! Repository for the `templates` table.
//!
//! Owns template metadata only. Every lookup is scoped by `owner_id`, so a
//! template belonging to another user is indistinguishable from a missing one.
//! Payload history is delegated to
//! [`TemplateVersionRepo`](super::TemplateVersionRepo).

use menuprint_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::template::{Template, UpdateTemplateMetadata};

const COLUMNS: &str = "id, owner_id, name, sub_template_types, created_at";

/// Foreign key from `templates.owner_id` to `users.id`.
pub const OWNER_CONSTRAINT: &str = "fk_templates_owner_id";

/// Provides metadata CRUD for templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert template metadata, returning the created row.
    ///
    /// Does not create a version. Run inside the same transaction as the
    /// first [`TemplateVersionRepo::append`](super::TemplateVersionRepo::append)
    /// so no versionless template ever becomes visible. An `owner_id` with
    /// no user row fails on [`OWNER_CONSTRAINT`].
    pub async fn create(
        conn: &mut PgConnection,
        owner_id: DbId,
        name: &str,
        sub_template_types: &[String],
    ) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (owner_id, name, sub_template_types) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(owner_id)
            .bind(name)
            .bind(sub_template_types)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a template by ID, only if it belongs to `owner_id`.
    ///
    /// Accepts the pool or a snapshot transaction, so the follow-up version
    /// reads can share its view.
    pub async fn find_owned<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(executor)
            .await
    }

    /// Find an owned template and lock its row until the surrounding
    /// transaction ends.
    ///
    /// This is the per-template critical section: appends and deletes for the
    /// same template queue up behind it.
    pub async fn lock_owned(
        conn: &mut PgConnection,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates \
             WHERE id = $1 AND owner_id = $2 \
             FOR UPDATE"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List every template owned by a user, oldest first.
    pub async fn list_owned<'e, E: PgExecutor<'e>>(
        executor: E,
        owner_id: DbId,
    ) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates \
             WHERE owner_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(owner_id)
            .fetch_all(executor)
            .await
    }

    /// Update template metadata. Only non-`None` fields are applied.
    ///
    /// Returns `None` if the template does not exist or is not owned.
    pub async fn update_metadata(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        input: &UpdateTemplateMetadata,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET \
                name = COALESCE($3, name), \
                sub_template_types = COALESCE($4, sub_template_types) \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.sub_template_types)
            .fetch_optional(pool)
            .await
    }

    /// Delete an owned template row. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign-key violation while versions remain; delete them
    /// first with
    /// [`TemplateVersionRepo::delete_all`](super::TemplateVersionRepo::delete_all)
    /// in the same transaction.
    pub async fn delete(
        conn: &mut PgConnection,
        id: DbId,
        owner_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
