pub mod models;
pub mod routes;
pub mod store;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use store::BookStore;

/// Book catalogue module: mounted at `/book`
pub struct BookModule {
    store: BookStore,
}

impl BookModule {
    pub const fn new(store: BookStore) -> Self {
        Self { store }
    }
}

/// Schema for the `book` table.
pub fn migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_init",
        up: r#"
            CREATE TABLE book (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL CHECK (title <> ''),
                author      TEXT NOT NULL CHECK (author <> ''),
                description TEXT NOT NULL CHECK (description <> ''),
                price       REAL NOT NULL
            );
            "#,
    }]
}

#[async_trait]
impl Module for BookModule {
    fn name(&self) -> &'static str {
        "book"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(ctx.db)
            .await
            .context("book storage is unreachable")?;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "book module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/get": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Book"],
                        "responses": {
                            "200": {
                                "description": "Every stored book, in insertion order",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error_response("Storage failure")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Fetch one book",
                        "tags": ["Book"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "The matching book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "404": error_response("No book has this id"),
                            "500": error_response("Storage failure")
                        }
                    }
                },
                "/add": {
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Book"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "The created book with its assigned id",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "400": error_response("Body is not a JSON object of the expected shape"),
                            "422": error_response("A field is missing, empty, or not a number"),
                            "500": error_response("Storage failure")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Book module health check",
                        "tags": ["Book"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "description": { "type": "string" },
                            "price": { "type": "number", "format": "double" }
                        },
                        "required": ["id", "title", "author", "description", "price"]
                    },
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "author": { "type": "string", "minLength": 1 },
                            "description": { "type": "string", "minLength": 1 },
                            "price": {
                                "description": "A number, or a string holding one",
                                "type": ["number", "string"]
                            }
                        },
                        "required": ["title", "author", "description", "price"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        migrations()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "book module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "book module stopped");
        Ok(())
    }
}
