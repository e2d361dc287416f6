//! Route definitions for the `/templates` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /                                 list
/// POST   /                                 create
/// GET    /{id}                             get_by_id
/// DELETE /{id}                             delete
/// PATCH  /{id}/metadata                    update_metadata
/// GET    /{id}/versions                    list_versions
/// POST   /{id}/versions                    add_version
/// GET    /{id}/versions/{version_id}       get_version
/// GET    /{id}/history                     verify_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(templates::list).post(templates::create))
        .route("/{id}", get(templates::get_by_id).delete(templates::delete))
        .route("/{id}/metadata", patch(templates::update_metadata))
        .route(
            "/{id}/versions",
            get(templates::list_versions).post(templates::add_version),
        )
        .route("/{id}/versions/{version_id}", get(templates::get_version))
        .route("/{id}/history", get(templates::verify_history))
}
