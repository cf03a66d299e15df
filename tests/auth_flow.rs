mod common;

use axum::http::StatusCode;
use catalog_app::modules::auth::repository::UserRepository;
use catalog_authz::{Claims, Role, TokenService, TokenSubject};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::json;

use common::{TestApp, ADMIN_EMAIL, AUDIENCE, ISSUER, SECRET};

fn decode_claims(token: &str) -> Claims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_audience(&[AUDIENCE]);
    decode::<Claims>(token, &DecodingKey::from_secret(SECRET.as_bytes()), &validation)
        .unwrap()
        .claims
}

#[tokio::test]
async fn registration_issues_a_reader_token() {
    let app = TestApp::spawn().await;

    let response = app.register("new.reader@example.com", "Reader1!").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("refreshToken").is_none());

    let claims = decode_claims(response.body["token"].as_str().unwrap());
    assert_eq!(claims.roles, vec![Role::Reader]);
    assert_eq!(claims.email, "new.reader@example.com");
    assert_eq!(claims.name, "Test Reader");
    assert_eq!(claims.exp - claims.iat, 30 * 60);
}

#[tokio::test]
async fn duplicate_emails_are_rejected_ignoring_case() {
    let app = TestApp::spawn().await;

    assert_eq!(
        app.register("dup@example.com", "Reader1!").await.status,
        StatusCode::OK
    );

    let again = app.register("DUP@example.com", "Reader1!").await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.error_code(), "duplicate_user");

    let other = app.register("other@example.com", "Reader1!").await;
    assert_eq!(other.status, StatusCode::OK);
}

#[tokio::test]
async fn weak_passwords_and_bad_emails_fail_validation() {
    let app = TestApp::spawn().await;

    let weak = app.register("weak@example.com", "short").await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak.error_code(), "validation_error");
    assert!(weak.body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .all(|d| d["field"] == "password"));

    let bad_email = app.register("not-an-email", "Reader1!").await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.body["error"]["details"][0]["field"], "email");
}

#[tokio::test]
async fn login_checks_credentials() {
    let app = TestApp::spawn().await;
    app.register("login@example.com", "Reader1!").await;

    let wrong = app.login("login@example.com", "Reader2").await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.error_code(), "invalid_credentials");

    let unknown = app.login("nobody@example.com", "Reader1!").await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        unknown.body["error"]["message"],
        wrong.body["error"]["message"]
    );

    let ok = app.login("LOGIN@example.com", "Reader1!").await;
    assert_eq!(ok.status, StatusCode::OK);
    let expires: DateTime<Utc> = ok.body["tokenExpires"].as_str().unwrap().parse().unwrap();
    let minutes = (expires - Utc::now()).num_minutes();
    assert!((29..=30).contains(&minutes), "token expires in {minutes} minutes");
}

#[tokio::test]
async fn me_reads_the_account_behind_the_token() {
    let app = TestApp::spawn().await;
    let registered = app.register("me@example.com", "Reader1!").await;
    let token = registered.body["token"].as_str().unwrap();

    let me = app.send("GET", "/api/auth/me", Some(token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "me@example.com");
    assert_eq!(me.body["fullName"], "Test Reader");
    assert_eq!(me.body["roles"], json!(["Reader"]));
    assert_eq!(me.body["id"], decode_claims(token).sub);

    let anonymous = app.send("GET", "/api/auth/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    // Valid signature, but no such account.
    let orphan = app.token_with_roles(&[Role::Reader]);
    let orphan = app.send("GET", "/api/auth/me", Some(&orphan), None).await;
    assert_eq!(orphan.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn foreign_tokens_are_rejected() {
    let app = TestApp::spawn().await;
    let subject = TokenSubject {
        id: "u-1",
        email: "x@example.com",
        full_name: "X",
        roles: &[Role::Admin],
    };

    let wrong_secret = TokenService::new(b"another-secret-that-is-long-enough!!", ISSUER, AUDIENCE, 30)
        .issue(subject)
        .unwrap();
    let wrong_issuer = TokenService::new(SECRET.as_bytes(), "someone-else", AUDIENCE, 30)
        .issue(subject)
        .unwrap();
    let wrong_audience = TokenService::new(SECRET.as_bytes(), ISSUER, "other-client", 30)
        .issue(subject)
        .unwrap();

    for issued in [wrong_secret, wrong_issuer, wrong_audience] {
        let response = app
            .send(
                "POST",
                "/api/categories",
                Some(&issued.token),
                Some(json!({ "name": "Nope" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn refresh_is_not_implemented() {
    let app = TestApp::spawn().await;
    let response = app.send("POST", "/api/auth/refresh", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.error_code(), "not_implemented");
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let app = TestApp::spawn().await;
    app.catalog.init().await.unwrap();
    app.catalog.init().await.unwrap();

    assert_eq!(app.store.list_roles().await.unwrap(), Role::ALL.to_vec());
    let admin = app.store.find_by_email(ADMIN_EMAIL).await.unwrap().unwrap();
    assert_eq!(admin.roles, vec![Role::Admin]);

    let login = app.login(ADMIN_EMAIL, common::ADMIN_PASSWORD).await;
    assert_eq!(login.body["roles"], json!(["Admin"]));
}

#[tokio::test]
async fn seeding_promotes_an_existing_account() {
    let app = TestApp::with_settings(common::settings(false)).await;
    assert_eq!(app.store.list_roles().await.unwrap().len(), 3);

    app.register(ADMIN_EMAIL, "Reader1!").await;
    let before = app.store.find_by_email(ADMIN_EMAIL).await.unwrap().unwrap();
    assert_eq!(before.roles, vec![Role::Reader]);

    let promoted = catalog_app::Catalog::assemble(
        common::settings(true),
        catalog_app::Repositories::memory(app.store.clone()),
        None,
    )
    .unwrap();
    promoted.init().await.unwrap();

    let after = app.store.find_by_email(ADMIN_EMAIL).await.unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.roles, vec![Role::Reader, Role::Admin]);
}
