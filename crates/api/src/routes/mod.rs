pub mod auth;
pub mod health;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                               register (public)
/// /auth/token                                  token (public, form body)
///
/// /templates                                   list, create
/// /templates/{id}                              get, delete
/// /templates/{id}/metadata                     update metadata (PATCH)
/// /templates/{id}/versions                     list, add
/// /templates/{id}/versions/{version_id}        get one version
/// /templates/{id}/history                      verify history
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/templates", templates::router())
}
