use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Stored author row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub biography: Option<String>,
}

/// Writable author fields, normalized and ready to validate.
#[derive(Debug, Clone, Validate)]
pub struct AuthorDraft {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub biography: Option<String>,
}

impl AuthorDraft {
    /// Trim the fields; a blank biography becomes absent.
    pub fn from_dto(dto: &AuthorDto) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            biography: dto
                .biography
                .as_deref()
                .map(str::trim)
                .filter(|bio| !bio.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    /// Assigned by the server; ignored on input
    #[serde(default)]
    pub id: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
            biography: author.biography,
        }
    }
}
