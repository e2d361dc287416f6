//! Handlers for the `/auth` resource (register, token).

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Form, Json};
use menuprint_core::error::CoreError;
use menuprint_core::user::{validate_password_strength, validate_username};
use menuprint_db::error::is_unique_violation;
use menuprint_db::models::user::CreateUser;
use menuprint_db::repositories::user_repo::USERNAME_CONSTRAINT;
use menuprint_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Single message for both unknown usernames and wrong passwords.
const INVALID_CREDENTIALS: &str = "Incorrect username or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub username: String,
    pub message: &'static str,
}

/// Form body for `POST /auth/token` (`application/x-www-form-urlencoded`).
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// OAuth2-style bearer token response. Not wrapped in the data envelope.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account. Returns 409 if the username is already taken.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RegisterResponse>>)> {
    validate_username(&input.username)?;
    validate_password_strength(&input.password, state.config.password_min_length)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        username: input.username,
        password_hash,
    };
    let user = UserRepo::create(&state.pool, &create)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, USERNAME_CONSTRAINT) {
                AppError::Core(CoreError::Conflict("Username already registered".into()))
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegisterResponse {
                username: user.username,
                message: "User registered successfully",
            },
        }),
    ))
}

/// POST /api/v1/auth/token
///
/// Exchange username + password for a bearer access token.
pub async fn token(
    State(state): State<AppState>,
    Form(input): Form<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = %user.id, "Rejected token request with wrong password");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, &user.username, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: jwt.expires_in_secs(),
    }))
}
