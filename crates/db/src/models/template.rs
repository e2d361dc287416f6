//! Template model and DTOs.

use menuprint_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `templates` table.
///
/// `owner_id` is never serialized: every template a caller can see is their own.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub owner_id: DbId,
    pub name: String,
    pub sub_template_types: Vec<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a template together with its first version.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    #[serde(default)]
    pub sub_template_types: Vec<String>,
    /// Payload of version 1.
    pub data: serde_json::Value,
}

/// DTO for patching template metadata.
///
/// Each field is one slot of the merge: `Some` replaces the stored value as a
/// whole, `None` leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplateMetadata {
    pub name: Option<String>,
    pub sub_template_types: Option<Vec<String>>,
}

/// Identifier and version number returned after creating a template.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedTemplate {
    pub id: DbId,
    pub version: i32,
}

/// A template with its latest version attached.
///
/// Listing attaches a [`TemplateVersionSummary`](super::template_version::TemplateVersionSummary);
/// a single-template read attaches the full
/// [`TemplateVersion`](super::template_version::TemplateVersion).
#[derive(Debug, Clone, Serialize)]
pub struct TemplateWithLatest<V> {
    #[serde(flatten)]
    pub template: Template,
    pub latest_version: Option<V>,
}
