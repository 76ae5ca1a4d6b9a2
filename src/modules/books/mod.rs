pub mod factory;
pub mod handlers;
pub mod models;
pub mod store;
pub mod validation;

use async_trait::async_trait;
use axum::{middleware, routing::get, Router};
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use super::auth::{require_auth, AuthState};
use store::BookStore;

pub const BOOKS_MIGRATIONS: &[Migration] = &[Migration {
    id: "001_init",
    up: r#"
        CREATE TABLE books (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            title            TEXT NOT NULL,
            description      TEXT NULL,
            author           TEXT NOT NULL,
            genre            TEXT NOT NULL,
            publication_year INTEGER NOT NULL,
            pages            INTEGER NULL,
            publisher        TEXT NULL,
            created_at       TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at       TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#,
}];

/// Book catalogue: JWT-guarded CRUD over the `books` table
pub struct BooksModule {
    store: BookStore,
    auth: AuthState,
}

impl BooksModule {
    pub fn new(store: BookStore, auth: AuthState) -> Self {
        Self { store, auth }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(handlers::index).post(handlers::create))
            .route(
                "/{id}",
                get(handlers::show)
                    .put(handlers::update)
                    .delete(handlers::destroy),
            )
            .route_layer(middleware::from_fn_with_state(
                self.auth.clone(),
                require_auth,
            ))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str, key: &str, example: &str| {
            let mut properties = serde_json::Map::new();
            properties.insert(
                key.to_string(),
                json!({ "type": "string", "example": example }),
            );
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "type": "object", "properties": properties }
                    }
                }
            })
        };
        let envelope = |description: &str, example: &str, data: serde_json::Value| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": {
                                "message": { "type": "string", "example": example },
                                "data": data
                            }
                        }
                    }
                }
            })
        };
        let book_ref = json!({ "$ref": "#/components/schemas/Book" });
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "description": "Book ID",
            "schema": { "type": "integer" }
        }]);
        let body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookInput" }
                }
            }
        });
        let security = json!([{ "jwt": [] }]);
        let validation = json!({
            "description": "Validation error",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ValidationError" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List all books",
                        "tags": ["Books"],
                        "security": security,
                        "responses": {
                            "200": envelope("Books found", "Books found", json!({ "type": "array", "items": &book_ref })),
                            "401": error("Unauthenticated", "message", "Unauthenticated."),
                            "404": error("No books found", "message", "No books found")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": security,
                        "requestBody": body,
                        "responses": {
                            "201": envelope("Book created", "Book created", book_ref.clone()),
                            "401": error("Unauthenticated", "message", "Unauthenticated."),
                            "422": validation,
                            "500": error("Internal Error", "error", "Internal Error")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Show a book",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": id_param,
                        "responses": {
                            "200": envelope("Book found", "Book found", book_ref.clone()),
                            "401": error("Unauthenticated", "message", "Unauthenticated."),
                            "404": error("Book not found", "error", "Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": id_param,
                        "requestBody": body,
                        "responses": {
                            "200": envelope("Book updated", "Book updated", book_ref.clone()),
                            "401": error("Unauthenticated", "message", "Unauthenticated."),
                            "404": error("Book not found", "error", "Book not found"),
                            "422": validation,
                            "500": error("Internal Error", "error", "Internal Error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": security,
                        "parameters": id_param,
                        "responses": {
                            "200": error("Book deleted", "message", "Book deleted"),
                            "401": error("Unauthenticated", "message", "Unauthenticated."),
                            "404": error("Book not found", "error", "Book not found"),
                            "500": error("Internal Error", "error", "Internal Error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64", "example": 1 },
                            "title": { "type": "string", "example": "The Great Gatsby" },
                            "description": { "type": "string", "nullable": true },
                            "author": { "type": "string", "example": "F. Scott Fitzgerald" },
                            "genre": { "type": "string", "example": "Novel" },
                            "publication_year": { "type": "integer", "example": 1925 },
                            "pages": { "type": "integer", "nullable": true, "example": 180 },
                            "publisher": { "type": "string", "nullable": true, "example": "Scribner" }
                        },
                        "required": ["id", "title", "author", "genre", "publication_year"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "description": { "type": "string", "nullable": true },
                            "author": { "type": "string" },
                            "genre": { "type": "string" },
                            "publication_year": { "type": "integer", "description": "Not later than the current year" },
                            "pages": { "type": "integer", "nullable": true },
                            "publisher": { "type": "string", "nullable": true }
                        },
                        "required": ["title", "author", "genre", "publication_year"]
                    },
                    "ValidationError": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string", "example": "The title is required." },
                            "errors": {
                                "type": "object",
                                "additionalProperties": { "type": "array", "items": { "type": "string" } }
                            }
                        },
                        "required": ["message", "errors"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        BOOKS_MIGRATIONS.to_vec()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: BookStore, auth: AuthState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store, auth))
}
