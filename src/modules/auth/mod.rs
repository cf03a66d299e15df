//! Accounts, sign-in and token issuance.

pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use catalog_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use self::models::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};
use self::service::AuthService;
use super::{error_response, schema_json};

pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    /// Seeds roles and the configured administrator.
    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let outcome = self
            .service
            .seed(ctx.settings.auth.admin.as_ref())
            .await
            .map_err(anyhow::Error::new)
            .context("failed to seed roles and administrator")?;

        tracing::info!(module = self.name(), ?outcome, "auth module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let auth_response = json!({
            "description": "Signed in",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/AuthResponse" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Register a Reader account",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/RegisterRequest" } } }
                        },
                        "responses": {
                            "200": auth_response,
                            "400": error_response("Invalid input or email already registered")
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Exchange credentials for a token",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/LoginRequest" } } }
                        },
                        "responses": {
                            "200": auth_response,
                            "401": error_response("Invalid email or password")
                        }
                    }
                },
                "/me": {
                    "get": {
                        "summary": "Current account",
                        "tags": ["Auth"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/MeResponse" } } }
                            },
                            "401": error_response("Missing or invalid token")
                        }
                    }
                },
                "/refresh": {
                    "post": {
                        "summary": "Refresh a token (not supported)",
                        "tags": ["Auth"],
                        "responses": {
                            "501": error_response("Token refresh is not implemented")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "RegisterRequest": schema_json::<RegisterRequest>(),
                    "LoginRequest": schema_json::<LoginRequest>(),
                    "AuthResponse": schema_json::<AuthResponse>(),
                    "MeResponse": schema_json::<MeResponse>()
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_accounts",
            up: r#"
                CREATE TABLE IF NOT EXISTS users (
                    id            UUID PRIMARY KEY,
                    email         VARCHAR(256) NOT NULL,
                    full_name     VARCHAR(200) NOT NULL,
                    password_hash TEXT         NOT NULL,
                    created_at    TIMESTAMPTZ  NOT NULL DEFAULT now()
                );
                CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_key ON users (lower(email));

                CREATE TABLE IF NOT EXISTS roles (
                    name VARCHAR(32) PRIMARY KEY
                );

                CREATE TABLE IF NOT EXISTS user_roles (
                    user_id   UUID        NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                    role_name VARCHAR(32) NOT NULL REFERENCES roles (name),
                    PRIMARY KEY (user_id, role_name)
                );
                "#,
        }]
    }
}
