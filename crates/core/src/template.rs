//! Template metadata and payload validation.
//!
//! The payload of a version is opaque: the only structural requirement is
//! that it is a JSON object. Its keys (`rows`, `cols`, `paperSize`,
//! `menu_items`, ...) are owned by the client and stored verbatim.

use serde_json::Value;

use crate::error::CoreError;

/// Maximum length of a template name, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum number of sub-template-type tags on one template.
pub const MAX_SUB_TEMPLATE_TYPES: usize = 50;

/// Maximum length of a single sub-template-type tag, in characters.
pub const MAX_TAG_LEN: usize = 100;

/// Validate a template name (non-blank, at most [`MAX_NAME_LEN`] chars).
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate the sub-template-type tags.
///
/// The list is an ordered set: tags must be non-blank and unique. An empty
/// list is allowed.
pub fn validate_sub_template_types(types: &[String]) -> Result<(), CoreError> {
    if types.len() > MAX_SUB_TEMPLATE_TYPES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_SUB_TEMPLATE_TYPES} sub template types are allowed"
        )));
    }
    for (idx, tag) in types.iter().enumerate() {
        if tag.trim().is_empty() {
            return Err(CoreError::Validation(
                "Sub template types must not be empty".into(),
            ));
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(CoreError::Validation(format!(
                "Sub template type '{tag}' exceeds {MAX_TAG_LEN} characters"
            )));
        }
        if types[..idx].contains(tag) {
            return Err(CoreError::Validation(format!(
                "Duplicate sub template type '{tag}'"
            )));
        }
    }
    Ok(())
}

/// Validate a version payload: it must be a JSON object.
pub fn validate_payload(data: &Value) -> Result<(), CoreError> {
    if !data.is_object() {
        return Err(CoreError::Validation(
            "Template data must be a JSON object".into(),
        ));
    }
    Ok(())
}

/// Validate a metadata patch. Absent fields are not checked; they leave the
/// stored value untouched.
pub fn validate_metadata_patch(
    name: Option<&str>,
    sub_template_types: Option<&[String]>,
) -> Result<(), CoreError> {
    if let Some(name) = name {
        validate_name(name)?;
    }
    if let Some(types) = sub_template_types {
        validate_sub_template_types(types)?;
    }
    Ok(())
}
