//! Catalog modules. Registration order matters: `books` references
//! `authors` and `categories`, so its migrations must run after theirs.

pub mod auth;
pub mod authors;
pub mod books;
pub mod categories;

use serde_json::{json, Value};
use utoipa::PartialSchema;

/// JSON rendering of a `ToSchema` type for an OpenAPI fragment.
pub(crate) fn schema_json<T: PartialSchema>() -> Value {
    serde_json::to_value(T::schema()).unwrap_or_else(|_| json!({ "type": "object" }))
}

pub(crate) fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn id_parameter() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int32" }
    })
}

/// Paths for list/get/create/replace/delete over one entity.
///
/// `guarded_delete` adds the 409 returned while other rows still reference
/// the entity.
pub(crate) fn crud_paths(tag: &str, noun: &str, schema: &str, guarded_delete: bool) -> Value {
    let reference = json!({ "$ref": format!("#/components/schemas/{schema}") });
    let body = json!({
        "required": true,
        "content": { "application/json": { "schema": reference } }
    });

    let mut delete_responses = json!({
        "204": { "description": format!("{noun} deleted") },
        "401": error_response("Missing or invalid token"),
        "403": error_response("Admin role required"),
        "404": error_response(&format!("{noun} not found"))
    });
    if guarded_delete {
        delete_responses["409"] = error_response(&format!("{noun} is referenced by books"));
    }

    json!({
        "/": {
            "get": {
                "summary": format!("List {tag}"),
                "tags": [tag],
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {
                            "application/json": {
                                "schema": { "type": "array", "items": reference }
                            }
                        }
                    }
                }
            },
            "post": {
                "summary": format!("Create {noun}"),
                "tags": [tag],
                "security": [{ "bearerAuth": [] }],
                "requestBody": body,
                "responses": {
                    "201": {
                        "description": "Created",
                        "headers": { "Location": { "schema": { "type": "string" } } },
                        "content": { "application/json": { "schema": reference } }
                    },
                    "400": error_response("Invalid input"),
                    "401": error_response("Missing or invalid token"),
                    "403": error_response("Editor or Admin role required")
                }
            }
        },
        "/{id}": {
            "parameters": [id_parameter()],
            "get": {
                "summary": format!("Get {noun}"),
                "tags": [tag],
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": { "application/json": { "schema": reference } }
                    },
                    "404": error_response(&format!("{noun} not found"))
                }
            },
            "put": {
                "summary": format!("Replace {noun}"),
                "tags": [tag],
                "security": [{ "bearerAuth": [] }],
                "requestBody": body,
                "responses": {
                    "204": { "description": format!("{noun} updated") },
                    "400": error_response("Invalid input"),
                    "401": error_response("Missing or invalid token"),
                    "403": error_response("Admin role required"),
                    "404": error_response(&format!("{noun} not found"))
                }
            },
            "delete": {
                "summary": format!("Delete {noun}"),
                "tags": [tag],
                "security": [{ "bearerAuth": [] }],
                "responses": delete_responses
            }
        }
    })
}
