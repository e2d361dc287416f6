//! Template orchestration over the registry and the version store.
//!
//! Every operation takes the caller's user id and starts with an
//! owner-scoped lookup. A template owned by someone else yields exactly the
//! same [`CoreError::NotFound`] as a missing one.
//!
//! Create, add-version, and delete run in a single transaction; dropping the
//! transaction on an early return rolls back every step already taken.
//! Reads that touch both tables run in one `REPEATABLE READ` snapshot, so a
//! concurrent delete is either wholly visible or not at all.

use menuprint_core::error::CoreError;
use menuprint_core::template::{
    validate_metadata_patch, validate_name, validate_payload, validate_sub_template_types,
};
use menuprint_core::types::DbId;
use menuprint_core::versioning::is_contiguous_history;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{is_foreign_key_violation, ServiceError};
use crate::models::template::{
    CreateTemplate, CreatedTemplate, Template, TemplateWithLatest, UpdateTemplateMetadata,
};
use crate::models::template_version::{
    HistoryReport, TemplateVersion, TemplateVersionList, TemplateVersionSummary,
};
use crate::repositories::template_repo::OWNER_CONSTRAINT;
use crate::repositories::{TemplateRepo, TemplateVersionRepo};

/// Stateless orchestrator for template operations.
pub struct TemplateService;

impl TemplateService {
    /// Create a template and its version 1 atomically.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateTemplate,
    ) -> Result<CreatedTemplate, ServiceError> {
        validate_name(&input.name)?;
        validate_sub_template_types(&input.sub_template_types)?;
        validate_payload(&input.data)?;

        let mut tx = pool.begin().await?;
        let template =
            TemplateRepo::create(&mut *tx, owner_id, &input.name, &input.sub_template_types)
                .await
                .map_err(|e| {
                    if is_foreign_key_violation(&e, OWNER_CONSTRAINT) {
                        // A validly signed token for an account that no longer exists.
                        ServiceError::from(CoreError::Unauthorized("Unknown user".into()))
                    } else {
                        ServiceError::from(e)
                    }
                })?;
        let first = TemplateVersionRepo::append(&mut *tx, template.id, &input.data).await?;
        tx.commit().await?;

        tracing::info!(
            %owner_id,
            template_id = %template.id,
            version = first.version,
            "Template created"
        );

        Ok(CreatedTemplate {
            id: template.id,
            version: first.version,
        })
    }

    /// List the caller's templates, each with a summary of its latest version.
    pub async fn list(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<TemplateWithLatest<TemplateVersionSummary>>, ServiceError> {
        let mut tx = begin_snapshot(pool).await?;
        let templates = TemplateRepo::list_owned(&mut *tx, owner_id).await?;

        let mut result = Vec::with_capacity(templates.len());
        for template in templates {
            let latest_version = TemplateVersionRepo::latest(&mut *tx, template.id).await?;
            result.push(TemplateWithLatest {
                template,
                latest_version,
            });
        }
        tx.commit().await?;
        Ok(result)
    }

    /// Fetch one template with its latest version in full.
    pub async fn get(
        pool: &PgPool,
        owner_id: DbId,
        template_id: DbId,
    ) -> Result<TemplateWithLatest<TemplateVersion>, ServiceError> {
        let mut tx = begin_snapshot(pool).await?;
        let template = Self::ensure_owned(&mut tx, owner_id, template_id).await?;
        let latest_version = TemplateVersionRepo::latest_detail(&mut *tx, template.id).await?;
        tx.commit().await?;
        Ok(TemplateWithLatest {
            template,
            latest_version,
        })
    }

    /// Delete a template and all of its versions in one transaction.
    ///
    /// Versions are removed first; the template row last.
    pub async fn delete(
        pool: &PgPool,
        owner_id: DbId,
        template_id: DbId,
    ) -> Result<(), ServiceError> {
        let mut tx = pool.begin().await?;

        TemplateRepo::lock_owned(&mut *tx, template_id, owner_id)
            .await?
            .ok_or_else(|| CoreError::template_not_found(template_id))?;

        let removed_versions = TemplateVersionRepo::delete_all(&mut *tx, template_id).await?;
        let deleted = TemplateRepo::delete(&mut *tx, template_id, owner_id).await?;
        if !deleted {
            return Err(CoreError::template_not_found(template_id).into());
        }
        tx.commit().await?;

        tracing::info!(
            %owner_id,
            %template_id,
            removed_versions,
            "Template deleted"
        );
        Ok(())
    }

    /// Append a new version to an owned template, returning its number.
    ///
    /// The template row stays locked until the version is committed, so
    /// concurrent appends to one template are numbered one after another and
    /// cannot interleave with its deletion.
    pub async fn add_version(
        pool: &PgPool,
        owner_id: DbId,
        template_id: DbId,
        data: &serde_json::Value,
    ) -> Result<TemplateVersionSummary, ServiceError> {
        validate_payload(data)?;

        let mut tx = pool.begin().await?;
        TemplateRepo::lock_owned(&mut *tx, template_id, owner_id)
            .await?
            .ok_or_else(|| CoreError::template_not_found(template_id))?;
        let version = TemplateVersionRepo::append(&mut *tx, template_id, data).await?;
        tx.commit().await?;

        tracing::info!(
            %owner_id,
            %template_id,
            version = version.version,
            "Template version added"
        );
        Ok(TemplateVersionSummary::from(&version))
    }

    /// List version summaries of an owned template, ascending.
    pub async fn list_versions(
        pool: &PgPool,
        owner_id: DbId,
        template_id: DbId,
    ) -> Result<TemplateVersionList, ServiceError> {
        let mut tx = begin_snapshot(pool).await?;
        Self::ensure_owned(&mut tx, owner_id, template_id).await?;
        let versions = TemplateVersionRepo::list(&mut *tx, template_id).await?;
        tx.commit().await?;
        Ok(TemplateVersionList {
            id: template_id,
            versions,
        })
    }

    /// Fetch one version, payload included.
    ///
    /// A version id that does not belong to this template is reported as a
    /// missing version, not a missing template.
    pub async fn get_version(
        pool: &PgPool,
        owner_id: DbId,
        template_id: DbId,
        version_id: DbId,
    ) -> Result<TemplateVersion, ServiceError> {
        let mut tx = begin_snapshot(pool).await?;
        Self::ensure_owned(&mut tx, owner_id, template_id).await?;
        let version = TemplateVersionRepo::find_in_template(&mut *tx, template_id, version_id)
            .await?
            .ok_or_else(|| CoreError::version_not_found(version_id))?;
        tx.commit().await?;
        Ok(version)
    }

    /// Apply a metadata patch and return the updated template.
    ///
    /// Absent fields keep their stored values.
    pub async fn update_metadata(
        pool: &PgPool,
        owner_id: DbId,
        template_id: DbId,
        input: &UpdateTemplateMetadata,
    ) -> Result<Template, ServiceError> {
        validate_metadata_patch(input.name.as_deref(), input.sub_template_types.as_deref())?;

        let template = TemplateRepo::update_metadata(pool, template_id, owner_id, input)
            .await?
            .ok_or_else(|| CoreError::template_not_found(template_id))?;

        tracing::info!(%owner_id, %template_id, "Template metadata updated");
        Ok(template)
    }

    /// Check that an owned template's version numbers are exactly `1..=k`.
    pub async fn verify_history(
        pool: &PgPool,
        owner_id: DbId,
        template_id: DbId,
    ) -> Result<HistoryReport, ServiceError> {
        let mut tx = begin_snapshot(pool).await?;
        Self::ensure_owned(&mut tx, owner_id, template_id).await?;
        let numbers = TemplateVersionRepo::version_numbers(&mut *tx, template_id).await?;
        tx.commit().await?;
        let contiguous = is_contiguous_history(&numbers);
        if !contiguous {
            tracing::warn!(%template_id, versions = ?numbers, "Template history is not contiguous");
        }
        Ok(HistoryReport {
            template_id,
            version_count: numbers.len(),
            latest_version: numbers.last().copied(),
            contiguous,
        })
    }

    /// Owner-scoped lookup or [`CoreError::NotFound`].
    async fn ensure_owned(
        tx: &mut Transaction<'static, Postgres>,
        owner_id: DbId,
        template_id: DbId,
    ) -> Result<Template, ServiceError> {
        let template = TemplateRepo::find_owned(&mut **tx, template_id, owner_id)
            .await?
            .ok_or_else(|| CoreError::template_not_found(template_id))?;
        Ok(template)
    }
}

/// Open a read-only transaction whose statements all see one snapshot.
async fn begin_snapshot(pool: &PgPool) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}
