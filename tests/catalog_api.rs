mod common;

use axum::http::{header, StatusCode};
use catalog_authz::Role;
use serde_json::json;

use common::TestApp;

async fn seed_references(app: &TestApp, token: &str) -> (i64, i64) {
    let author = app
        .create(
            "/api/authors",
            token,
            json!({ "name": "Frank Herbert", "biography": "Wrote Dune." }),
        )
        .await;
    let category = app
        .create("/api/categories", token, json!({ "name": "Science Fiction" }))
        .await;
    (
        author["id"].as_i64().unwrap(),
        category["id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn end_to_end_catalog_flow() {
    let app = TestApp::spawn().await;

    let registered = app.register("reader@example.com", "Reader1!").await;
    assert_eq!(registered.status, StatusCode::OK);
    let login = app.login("reader@example.com", "Reader1!").await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["userEmail"], "reader@example.com");
    assert_eq!(login.body["roles"], json!(["Reader"]));

    let admin = app.admin_token().await;
    let (author_id, category_id) = seed_references(&app, &admin).await;
    let book = app
        .create(
            "/api/books",
            &admin,
            json!({
                "title": "Dune",
                "authorId": author_id,
                "categoryId": category_id,
                "price": 19.99
            }),
        )
        .await;
    assert_eq!(book["authorName"], "Frank Herbert");
    assert_eq!(book["categoryName"], "Science Fiction");

    let reader = login.body["token"].as_str().unwrap();
    let listed = app.send("GET", "/api/books", Some(reader), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    let books = listed.body.as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Dune");
    assert_eq!(books[0]["authorName"], "Frank Herbert");
    assert_eq!(books[0]["categoryName"], "Science Fiction");
    assert_eq!(books[0]["price"], json!(19.99));
}

#[tokio::test]
async fn creating_books_requires_editor_or_admin() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (author_id, category_id) = seed_references(&app, &admin).await;
    let body = json!({
        "title": "Children of Dune",
        "authorId": author_id,
        "categoryId": category_id,
        "price": 12.5
    });

    let anonymous = app.send("POST", "/api/books", None, Some(body.clone())).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let reader = app.token_with_roles(&[Role::Reader]);
    let forbidden = app
        .send("POST", "/api/books", Some(&reader), Some(body.clone()))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.error_code(), "forbidden");

    let editor = app.token_with_roles(&[Role::Editor]);
    let created = app
        .send("POST", "/api/books", Some(&editor), Some(body.clone()))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_i64().unwrap();
    assert_eq!(
        created.headers[header::LOCATION].to_str().unwrap(),
        format!("/api/books/{id}")
    );
    assert_eq!(created.body["title"], "Children of Dune");

    let by_admin = app.send("POST", "/api/books", Some(&admin), Some(body)).await;
    assert_eq!(by_admin.status, StatusCode::CREATED);
}

#[tokio::test]
async fn replace_and_delete_are_admin_only() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let editor = app.token_with_roles(&[Role::Editor]);
    let category = app
        .create("/api/categories", &editor, json!({ "name": "Poetry" }))
        .await;
    let path = format!("/api/categories/{}", category["id"]);

    let denied = app
        .send("PUT", &path, Some(&editor), Some(json!({ "name": "Verse" })))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    let denied = app.send("DELETE", &path, Some(&editor), None).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let replaced = app
        .send("PUT", &path, Some(&admin), Some(json!({ "name": " Verse " })))
        .await;
    assert_eq!(replaced.status, StatusCode::NO_CONTENT);
    let fetched = app.send("GET", &path, None, None).await;
    assert_eq!(fetched.body["name"], "Verse");

    let deleted = app.send("DELETE", &path, Some(&admin), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let gone = app.send("GET", &path, None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let missing = app
        .send("PUT", &path, Some(&admin), Some(json!({ "name": "Again" })))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn books_with_missing_references_are_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (author_id, category_id) = seed_references(&app, &admin).await;

    for (author, category) in [(999, category_id), (author_id, 999)] {
        let response = app
            .send(
                "POST",
                "/api/books",
                Some(&admin),
                Some(json!({
                    "title": "Ghost",
                    "authorId": author,
                    "categoryId": category,
                    "price": 1
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "invalid_reference");
    }

    let listed = app.send("GET", "/api/books", None, None).await;
    assert_eq!(listed.body, json!([]));
}

#[tokio::test]
async fn invalid_fields_are_reported() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let blank = app
        .send("POST", "/api/authors", Some(&admin), Some(json!({ "name": "   " })))
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.error_code(), "validation_error");
    assert_eq!(blank.body["error"]["details"][0]["field"], "name");

    let (author_id, category_id) = seed_references(&app, &admin).await;
    let negative = app
        .send(
            "POST",
            "/api/books",
            Some(&admin),
            Some(json!({
                "title": "Cheap",
                "authorId": author_id,
                "categoryId": category_id,
                "price": -1
            })),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
    assert_eq!(negative.body["error"]["details"][0]["field"], "price");
}

#[tokio::test]
async fn malformed_requests_use_the_error_envelope() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let missing_name = app
        .send("POST", "/api/authors", Some(&admin), Some(json!({ "biography": "x" })))
        .await;
    assert_eq!(missing_name.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_name.error_code(), "validation_error");
    assert_eq!(missing_name.body["error"]["details"][0]["field"], "body");

    let wrong_type = app
        .send("POST", "/api/books", Some(&admin), Some(json!({ "title": "Dune", "price": "cheap" })))
        .await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_type.error_code(), "validation_error");

    let no_body = app.send("POST", "/api/categories", Some(&admin), None).await;
    assert_eq!(no_body.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_body.error_code(), "validation_error");

    let unregistered = app
        .send("POST", "/api/auth/register", None, Some(json!({ "email": "x@example.com" })))
        .await;
    assert_eq!(unregistered.status, StatusCode::BAD_REQUEST);
    assert_eq!(unregistered.error_code(), "validation_error");

    for uri in ["/api/books/abc", "/api/authors/99999999999"] {
        let response = app.send("GET", uri, None, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.error_code(), "validation_error");
    }
}

#[tokio::test]
async fn replacing_a_book_checks_references() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (author_id, category_id) = seed_references(&app, &admin).await;
    let book = app
        .create(
            "/api/books",
            &admin,
            json!({ "title": "Dune", "authorId": author_id, "categoryId": category_id, "price": 10 }),
        )
        .await;
    let path = format!("/api/books/{}", book["id"]);

    for (author, category) in [(999, category_id), (author_id, 999)] {
        let response = app
            .send(
                "PUT",
                &path,
                Some(&admin),
                Some(json!({
                    "title": "Dune",
                    "authorId": author,
                    "categoryId": category,
                    "price": 10
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "invalid_reference");
    }

    let unchanged = app.send("GET", &path, None, None).await;
    assert_eq!(unchanged.body["authorId"], json!(author_id));
    assert_eq!(unchanged.body["categoryId"], json!(category_id));
}

#[tokio::test]
async fn deleting_unknown_ids_is_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    for path in ["/api/authors/404", "/api/categories/404", "/api/books/404"] {
        let response = app.send("DELETE", path, Some(&admin), None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(response.error_code(), "not_found");
    }
}

#[tokio::test]
async fn referenced_authors_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (author_id, category_id) = seed_references(&app, &admin).await;
    let book = app
        .create(
            "/api/books",
            &admin,
            json!({
                "title": "Dune Messiah",
                "authorId": author_id,
                "categoryId": category_id,
                "price": 9
            }),
        )
        .await;

    let author_path = format!("/api/authors/{author_id}");
    let conflict = app.send("DELETE", &author_path, Some(&admin), None).await;
    assert_eq!(conflict.status, StatusCode::CONFLICT);
    assert_eq!(conflict.error_code(), "referential_conflict");

    let category_path = format!("/api/categories/{category_id}");
    let conflict = app.send("DELETE", &category_path, Some(&admin), None).await;
    assert_eq!(conflict.status, StatusCode::CONFLICT);

    let book_path = format!("/api/books/{}", book["id"]);
    let removed = app.send("DELETE", &book_path, Some(&admin), None).await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);

    let removed = app.send("DELETE", &author_path, Some(&admin), None).await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    let gone = app.send("GET", &author_path, None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.error_code(), "not_found");
}

#[tokio::test]
async fn updating_a_book_refreshes_reference_names() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (author_id, category_id) = seed_references(&app, &admin).await;
    let other = app
        .create("/api/authors", &admin, json!({ "name": "Brian Herbert" }))
        .await;
    let book = app
        .create(
            "/api/books",
            &admin,
            json!({ "title": "Dune", "authorId": author_id, "categoryId": category_id, "price": 10 }),
        )
        .await;
    let path = format!("/api/books/{}", book["id"]);

    let replaced = app
        .send(
            "PUT",
            &path,
            Some(&admin),
            Some(json!({
                "title": "Dune: House Atreides",
                "authorId": other["id"],
                "categoryId": category_id,
                "price": 11.5
            })),
        )
        .await;
    assert_eq!(replaced.status, StatusCode::NO_CONTENT);

    let fetched = app.send("GET", &path, None, None).await;
    assert_eq!(fetched.body["authorName"], "Brian Herbert");
    assert_eq!(fetched.body["price"], json!(11.5));
}

#[tokio::test]
async fn health_and_docs_are_public() {
    let app = TestApp::spawn().await;

    let health = app.send("GET", "/healthz", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, json!("ok"));

    let docs = app.send("GET", "/docs/openapi.json", None, None).await;
    assert_eq!(docs.status, StatusCode::OK);
    assert!(docs.body["paths"]["/api/books"]["post"].is_object());
    assert!(docs.body["paths"]["/api/auth/login"]["post"].is_object());
    assert!(docs.body["components"]["schemas"]["BookDto"].is_object());
    assert!(docs.body["components"]["securitySchemes"]["bearerAuth"].is_object());
}
