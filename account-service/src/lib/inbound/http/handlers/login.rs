use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Exchange credentials for a bearer access token.
///
/// Every credential failure (unknown email, wrong password, even a
/// malformed email) collapses into the same response, so the endpoint
/// cannot be used to probe which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    // Parse and validate email
    let email = EmailAddress::new(body.email)
        .map_err(|_| ApiError::BadRequest("Invalid credentials".to_string()))?;

    // Get user from database
    let user = state
        .user_service
        .get_user_by_email(&email)
        .await
        .map_err(|e| match e {
            UserError::NotFoundByEmail(_) => {
                ApiError::BadRequest("Invalid credentials".to_string())
            }
            _ => ApiError::from(e),
        })?;

    // Verify password and issue token
    let result = state
        .authenticator
        .authenticate(
            &body.password,
            &user.password_hash,
            user.id.0,
            Duration::minutes(state.token_ttl_minutes),
        )
        .map_err(|e| match e {
            auth::AuthenticationError::InvalidCredentials => {
                ApiError::BadRequest("Invalid credentials".to_string())
            }
            auth::AuthenticationError::Password(err) => {
                ApiError::InternalServerError(format!("Password verification failed: {}", err))
            }
            auth::AuthenticationError::Token(err) => {
                ApiError::InternalServerError(format!("Token issuance failed: {}", err))
            }
        })?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            access_token: result.access_token,
            token_type: "bearer".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub access_token: String,
    pub token_type: String,
}
