//! Shared response envelope types for API handlers.
//!
//! Template responses use a `{ "data": ... }` envelope. The token endpoint is
//! the one exception: it returns the bare OAuth2-style token object.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
