use anyhow::Context;
use axum::{extract::State, http::StatusCode, response::Response, Extension, Json};
use bookshelf_authz::{verify_password, Principal};
use bookshelf_http::{response, AppError, JsonObject};
use serde::Serialize;
use serde_json::Value;

use super::middleware::AuthState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

fn unauthorized() -> AppError {
    AppError::unauthorized("Unauthorized")
}

/// `POST /auth/login`: exchange email and password for a bearer token.
pub async fn login(
    State(auth): State<AuthState>,
    JsonObject(body): JsonObject,
) -> Result<Json<TokenResponse>, AppError> {
    let credential = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_owned);
    let (Some(email), Some(password)) = (credential("email"), credential("password")) else {
        return Err(unauthorized());
    };

    let Some(user) = auth.users.find_by_email(&email).await? else {
        tracing::info!("login rejected: unknown email");
        return Err(unauthorized());
    };

    // Argon2 verification blocks; run it on the blocking pool.
    let stored = user.password.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .context("password verification task failed")?
        .with_context(|| format!("stored password hash of user {} is unreadable", user.id))?;
    if !matches {
        tracing::info!(user_id = user.id, "login rejected: wrong password");
        return Err(unauthorized());
    }

    let issued = auth
        .guard
        .issue(user.id)
        .context("failed to issue access token")?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        token_type: "bearer",
        expires_in: issued.expires_in,
    }))
}

/// `POST /auth/logout`: revoke the token that authenticated this request.
pub async fn logout(
    State(auth): State<AuthState>,
    Extension(principal): Extension<Principal>,
) -> Result<Response, AppError> {
    auth.revoked
        .revoke(&principal.token_id, principal.expires_at)
        .await?;

    tracing::info!(user_id = principal.user_id, "user logged out");
    Ok(response::message(StatusCode::OK, "Successfully logged out"))
}
