pub mod handlers;
pub mod middleware;
pub mod store;

use anyhow::Context;
use async_trait::async_trait;
use axum::{routing::post, Router};
use bookshelf_authz::hash_password;
use bookshelf_kernel::{settings::SeedUser, InitCtx, Migration, Module};
use serde_json::json;

pub use middleware::{require_auth, AuthState};
pub use store::{RevokedTokens, User, UserStore};

pub const AUTH_MIGRATIONS: &[Migration] = &[Migration {
    id: "001_init",
    up: r#"
        CREATE TABLE users (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            email      TEXT NOT NULL UNIQUE,
            password   TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE revoked_tokens (
            jti        TEXT PRIMARY KEY,
            expires_at INTEGER NOT NULL
        );
        CREATE INDEX revoked_tokens_expires_at ON revoked_tokens (expires_at);
    "#,
}];

/// Login/logout over the token guard
pub struct AuthModule {
    state: AuthState,
}

impl AuthModule {
    pub fn new(state: AuthState) -> Self {
        Self { state }
    }
}

/// Create `name <email>` unless that email is taken. Returns `None` when the
/// user already existed.
pub async fn ensure_user(
    users: &UserStore,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    if users.find_by_email(email).await?.is_some() {
        return Ok(None);
    }

    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task failed")??;
    let user = users.create(name, email, &hash).await?;
    Ok(Some(user))
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if let Some(SeedUser {
            name,
            email,
            password,
        }) = &ctx.settings.auth.seed_user
        {
            match ensure_user(&self.state.users, name, email, password).await? {
                Some(user) => tracing::info!(user_id = user.id, %email, "seed user created"),
                None => tracing::debug!(%email, "seed user already present"),
            }
        }

        tracing::info!(
            module = self.name(),
            ttl_seconds = self.state.guard.ttl_seconds(),
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/logout", post(handlers::logout))
            .route_layer(axum::middleware::from_fn_with_state(
                self.state.clone(),
                require_auth,
            ))
            .route("/login", post(handlers::login))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/login": {
                    "post": {
                        "summary": "Login",
                        "description": "Login by email, password",
                        "tags": ["Authentication"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Credentials" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Success",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/AccessToken" }
                                    }
                                }
                            },
                            "401": {
                                "description": "Unauthorized",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "error": { "type": "string", "example": "Unauthorized" }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/logout": {
                    "post": {
                        "summary": "Logout",
                        "tags": ["Authentication"],
                        "security": [{ "jwt": [] }],
                        "responses": {
                            "200": {
                                "description": "Success",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "message": { "type": "string", "example": "Successfully logged out" }
                                            }
                                        }
                                    }
                                }
                            },
                            "401": {
                                "description": "Unauthenticated",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": {
                                                "message": { "type": "string", "example": "Unauthenticated." }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Credentials": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email", "example": "user.api@test.com" },
                            "password": { "type": "string", "format": "password" }
                        },
                        "required": ["email", "password"]
                    },
                    "AccessToken": {
                        "type": "object",
                        "properties": {
                            "access_token": { "type": "string" },
                            "token_type": { "type": "string", "example": "bearer" },
                            "expires_in": { "type": "integer", "example": 3600 }
                        },
                        "required": ["access_token", "token_type", "expires_in"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        AUTH_MIGRATIONS.to_vec()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "auth module stopped");
        Ok(())
    }
}

/// Create a new instance of the auth module
pub fn create_module(state: AuthState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthModule::new(state))
}
