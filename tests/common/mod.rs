#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use catalog_app::{Catalog, Repositories};
use catalog_authz::{Role, TokenSubject};
use catalog_app::store::MemoryStore;
use catalog_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret-0123456789abcdef";
pub const ISSUER: &str = "catalog-api";
pub const AUDIENCE: &str = "catalog-client";
pub const ADMIN_EMAIL: &str = "admin@catalog.local";
pub const ADMIN_PASSWORD: &str = "Admin123!";

pub fn settings(with_admin: bool) -> Settings {
    let admin = if with_admin {
        format!(
            r#"
            [auth.admin]
            email = "{ADMIN_EMAIL}"
            password = "{ADMIN_PASSWORD}"
            "#
        )
    } else {
        String::new()
    };

    Settings::from_toml(&format!(
        r#"
        [database]
        backend = "memory"

        [auth]
        jwt_secret = "{SECRET}"
        jwt_issuer = "{ISSUER}"
        jwt_audience = "{AUDIENCE}"
        {admin}
        "#
    ))
    .unwrap()
}

pub struct TestApp {
    pub catalog: Catalog,
    pub store: MemoryStore,
    pub router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_settings(settings(true)).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        let store = MemoryStore::new();
        let catalog =
            Catalog::assemble(settings, Repositories::memory(store.clone()), None).unwrap();
        catalog.init().await.unwrap();
        let router = catalog.router();
        Self {
            catalog,
            store,
            router,
        }
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Response {
            status,
            headers,
            body,
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Response {
        self.send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": email, "password": password, "fullName": "Test Reader" })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn admin_token(&self) -> String {
        let response = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    /// Sign a token directly; there is no endpoint granting Editor.
    pub fn token_with_roles(&self, roles: &[Role]) -> String {
        self.catalog
            .tokens()
            .issue(TokenSubject {
                id: "00000000-0000-0000-0000-000000000001",
                email: "staff@catalog.local",
                full_name: "Staff",
                roles,
            })
            .unwrap()
            .token
    }

    pub async fn create(&self, path: &str, token: &str, body: Value) -> Value {
        let response = self.send("POST", path, Some(token), Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }
}

#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Response {
    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }
}
