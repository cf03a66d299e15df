//! Domain error taxonomy shared by every catalog service.

use catalog_db::StoreError;
use catalog_http::AppError;
use serde_json::{json, Value};
use thiserror::Error;
use validator::ValidationErrors;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{message}")]
    Validation { message: String, details: Vec<Value> },

    /// A book points at an author or category that does not exist.
    #[error("{0}")]
    InvalidReference(String),

    #[error("a user with email '{0}' is already registered")]
    DuplicateUser(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{entity} {id} was not found")]
    NotFound { entity: &'static str, id: String },

    /// The row is still referenced by other rows.
    #[error("{0}")]
    ReferentialConflict(String),

    #[error("{0}")]
    NotImplemented(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Hashing or signing failed.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Validation {
            details: vec![json!({ "field": field, "error": message })],
            message: format!("{field}: {message}"),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<ValidationErrors> for CatalogError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<Value> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = wire_name(&field);
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    json!({ "field": field, "error": message })
                })
            })
            .collect();
        details.sort_by(|a, b| a["field"].as_str().cmp(&b["field"].as_str()));

        let fields: Vec<&str> = details.iter().filter_map(|d| d["field"].as_str()).collect();
        let message = format!("invalid fields: {}", fields.join(", "));

        Self::Validation { message, details }
    }
}

/// Request bodies are camelCase; validator reports Rust field names.
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !name.is_empty();
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

impl From<CatalogError> for AppError {
    fn from(error: CatalogError) -> Self {
        let message = error.to_string();
        match error {
            CatalogError::Validation { details, .. } => AppError::validation(details, message),
            CatalogError::InvalidReference(_) => {
                AppError::bad_request(message).with_code("invalid_reference")
            }
            CatalogError::DuplicateUser(_) => {
                AppError::bad_request(message).with_code("duplicate_user")
            }
            CatalogError::InvalidCredentials => {
                AppError::unauthorized(message).with_code("invalid_credentials")
            }
            CatalogError::Unauthenticated(_) => AppError::unauthorized(message),
            CatalogError::Forbidden(_) => AppError::forbidden(message),
            CatalogError::NotFound { .. } => AppError::not_found(message),
            CatalogError::ReferentialConflict(_) => {
                AppError::conflict(Vec::new(), message).with_code("referential_conflict")
            }
            CatalogError::NotImplemented(_) => AppError::not_implemented(message),
            CatalogError::Store(e) => AppError::Internal(anyhow::Error::new(e)),
            CatalogError::Internal(e) => AppError::Internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use validator::Validate;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1, max = 3, message = "must be 1 to 3 characters"))]
        name: String,
    }

    #[derive(Validate)]
    struct Profile {
        #[validate(length(min = 1, message = "must not be empty"))]
        full_name: String,
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let cases = [
            (CatalogError::validation("name", "required"), StatusCode::BAD_REQUEST),
            (CatalogError::InvalidReference("author 9".into()), StatusCode::BAD_REQUEST),
            (CatalogError::DuplicateUser("a@b.c".into()), StatusCode::BAD_REQUEST),
            (CatalogError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (CatalogError::Unauthenticated("no".into()), StatusCode::UNAUTHORIZED),
            (CatalogError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (CatalogError::not_found("author", 1), StatusCode::NOT_FOUND),
            (CatalogError::ReferentialConflict("used".into()), StatusCode::CONFLICT),
            (CatalogError::NotImplemented("later".into()), StatusCode::NOT_IMPLEMENTED),
            (
                CatalogError::Store(StoreError::Backend("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).status(), status);
        }
    }

    #[test]
    fn validator_errors_become_field_details() {
        let errors = Named {
            name: "toolong".into(),
        }
        .validate()
        .unwrap_err();

        match CatalogError::from(errors) {
            CatalogError::Validation { message, details } => {
                assert_eq!(message, "invalid fields: name");
                assert_eq!(details[0]["field"], "name");
                assert_eq!(details[0]["error"], "must be 1 to 3 characters");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn detail_fields_use_wire_names() {
        let errors = Profile {
            full_name: String::new(),
        }
        .validate()
        .unwrap_err();

        match CatalogError::from(errors) {
            CatalogError::Validation { message, details } => {
                assert_eq!(message, "invalid fields: fullName");
                assert_eq!(details[0]["field"], "fullName");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wire_name_converts_snake_case() {
        assert_eq!(wire_name("name"), "name");
        assert_eq!(wire_name("author_id"), "authorId");
        assert_eq!(wire_name("full_name"), "fullName");
    }
}
