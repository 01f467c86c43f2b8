pub mod error;
pub mod flash;
pub mod models;
pub mod repository;
pub mod routes;
pub mod seed;
pub mod service;
pub mod validation;

use async_trait::async_trait;
use axum::Router;
use folio_db::Database;
use folio_kernel::{InitCtx, Migration, Module};

use repository::BookRepository;
use routes::BooksState;
use seed::{seed_books, SeedOutcome};
use service::{BookQueryService, ReviewService};

pub const MODULE_NAME: &str = "books";

/// Book catalog and reviews module
pub struct BooksModule {
    repo: BookRepository,
}

impl BooksModule {
    pub fn new(db: Database) -> Self {
        Self {
            repo: BookRepository::new(db),
        }
    }

    pub fn repository(&self) -> &BookRepository {
        &self.repo
    }

    fn state(&self) -> BooksState {
        BooksState {
            queries: BookQueryService::new(self.repo.clone()),
            reviews: ReviewService::new(self.repo.clone()),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
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
        routes::router(self.state())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: repository::SCHEMA_SQL,
        }]
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if !ctx.settings.database.seed_on_start {
            tracing::info!(module = self.name(), "seeding disabled; books module started");
            return Ok(());
        }

        match seed_books(&self.repo).await? {
            SeedOutcome::Seeded { inserted } => {
                tracing::info!(
                    module = self.name(),
                    inserted,
                    "books module started with seed data"
                );
            }
            SeedOutcome::AlreadySeeded { existing } => {
                tracing::info!(module = self.name(), existing, "books module started");
            }
        }
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(db: Database) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(db))
}

fn openapi_fragment() -> serde_json::Value {
    let error_response = |description: &str| {
        serde_json::json!({
            "description": description,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        })
    };
    let book_id_param = serde_json::json!({
        "name": "book_id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    });

    serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books ordered by title",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "List of books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            },
            "/{book_id}": {
                "get": {
                    "summary": "Book detail with reviews, newest first",
                    "tags": ["Books"],
                    "parameters": [book_id_param.clone()],
                    "responses": {
                        "200": {
                            "description": "Book detail",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookDetail" }
                                }
                            }
                        },
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/{book_id}/reviews": {
                "post": {
                    "summary": "Submit a review",
                    "tags": ["Books"],
                    "parameters": [book_id_param],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/x-www-form-urlencoded": {
                                "schema": { "$ref": "#/components/schemas/ReviewForm" }
                            }
                        }
                    },
                    "responses": {
                        "303": {
                            "description": "Redirect to the book detail; outcome stored in the folio_flash cookie",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Redirect" }
                                }
                            }
                        },
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
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
                        "description": { "type": "string", "nullable": true }
                    },
                    "required": ["id", "title", "author"]
                },
                "Review": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "book_id": { "type": "integer", "format": "int64" },
                        "username": { "type": "string" },
                        "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                        "comment": { "type": "string" },
                        "created_at": { "type": "string", "format": "date-time" }
                    },
                    "required": ["id", "book_id", "username", "rating", "comment", "created_at"]
                },
                "Flash": {
                    "type": "object",
                    "properties": {
                        "kind": { "type": "string", "enum": ["success", "error"] },
                        "message": { "type": "string" }
                    },
                    "required": ["kind", "message"]
                },
                "BookDetail": {
                    "type": "object",
                    "properties": {
                        "book": { "$ref": "#/components/schemas/Book" },
                        "reviews": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Review" }
                        },
                        "flash": { "$ref": "#/components/schemas/Flash" }
                    },
                    "required": ["book", "reviews"]
                },
                "ReviewForm": {
                    "type": "object",
                    "properties": {
                        "username": { "type": "string" },
                        "rating": { "type": "string", "description": "Integer from 1 to 5" },
                        "comment": { "type": "string" }
                    },
                    "required": ["username", "rating", "comment"]
                },
                "Redirect": {
                    "type": "object",
                    "properties": {
                        "redirect": { "type": "string" },
                        "flash": { "$ref": "#/components/schemas/Flash" }
                    },
                    "required": ["redirect", "flash"]
                }
            }
        }
    })
}
