use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use bookshelf_authz::{bearer_token, AuthError, Principal, TokenGuard};
use bookshelf_http::AppError;
use bookshelf_kernel::settings::Settings;
use sqlx::SqlitePool;

use super::store::{RevokedTokens, UserStore};

/// Everything needed to issue and check bearer tokens.
#[derive(Clone)]
pub struct AuthState {
    pub guard: Arc<TokenGuard>,
    pub users: UserStore,
    pub revoked: RevokedTokens,
}

impl AuthState {
    pub fn new(settings: &Settings, pool: SqlitePool) -> Self {
        Self {
            guard: Arc::new(TokenGuard::new(
                settings.auth.jwt_secret.as_bytes(),
                settings.auth.token_ttl_seconds(),
            )),
            users: UserStore::new(pool.clone()),
            revoked: RevokedTokens::new(pool),
        }
    }

    /// Resolve the caller behind the request's bearer token.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AppError> {
        let claims = match bearer_token(headers).and_then(|token| self.guard.verify(token)) {
            Ok(claims) => claims,
            Err(err) => return Err(rejected(err)),
        };

        if self.revoked.contains(&claims.jti).await? {
            return Err(rejected(AuthError::Revoked));
        }

        let user_id = claims.user_id().map_err(rejected)?;
        let Some(user) = self.users.find(user_id).await? else {
            tracing::debug!(user_id, "bearer token names an unknown user");
            return Err(AppError::Unauthenticated);
        };

        Ok(Principal {
            user_id: user.id,
            email: user.email,
            token_id: claims.jti,
            expires_at: claims.exp,
        })
    }
}

fn rejected(err: AuthError) -> AppError {
    tracing::debug!(reason = %err, "bearer token rejected");
    AppError::Unauthenticated
}

/// Route layer guarding protected routes; the resolved [`Principal`] is
/// handed to handlers through request extensions.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = auth.authenticate(request.headers()).await?;
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
