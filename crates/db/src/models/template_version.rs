//! Template version models.
//!
//! Versions are immutable snapshots of a template's payload, numbered 1..k
//! per template. There is no update DTO: rows are only ever inserted, and
//! removed in bulk when their template is deleted.

use menuprint_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A full row from the `template_versions` table, payload included.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateVersion {
    pub id: DbId,
    pub template_id: DbId,
    pub version: i32,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
}

/// Listing projection of a version: no payload.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct TemplateVersionSummary {
    pub id: DbId,
    pub version: i32,
    pub created_at: Timestamp,
}

impl From<&TemplateVersion> for TemplateVersionSummary {
    fn from(v: &TemplateVersion) -> Self {
        Self {
            id: v.id,
            version: v.version,
            created_at: v.created_at,
        }
    }
}

/// All version summaries of one template, ascending by version number.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateVersionList {
    pub id: DbId,
    pub versions: Vec<TemplateVersionSummary>,
}

/// Result of checking a template's version numbers against `1..=k`.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryReport {
    pub template_id: DbId,
    pub version_count: usize,
    pub latest_version: Option<i32>,
    pub contiguous: bool,
}
