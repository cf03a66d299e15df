use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Largest price a `NUMERIC(12,2)` column holds.
const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Book row joined with the names of its author and category.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookRecord {
    pub id: i32,
    pub title: String,
    pub price: Decimal,
    pub author_id: i32,
    pub category_id: i32,
    pub author_name: String,
    pub category_name: String,
}

/// Writable book fields, normalized and ready to validate.
#[derive(Debug, Clone, Validate)]
pub struct BookDraft {
    #[validate(length(min = 1, max = 300, message = "must be between 1 and 300 characters"))]
    pub title: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub author_id: i32,
    pub category_id: i32,
}

impl BookDraft {
    /// Trim the title and round the price to cents, half away from zero like
    /// a `NUMERIC(12,2)` column.
    pub fn from_dto(dto: &BookDto) -> Self {
        Self {
            title: dto.title.trim().to_string(),
            price: dto
                .price
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            author_id: dto.author_id,
            category_id: dto.category_id,
        }
    }
}

fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative_price").with_message("must not be negative".into()));
    }
    if *value > MAX_PRICE {
        return Err(ValidationError::new("price_too_large")
            .with_message("must be at most 9999999999.99".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    /// Assigned by the server; ignored on input
    #[serde(default)]
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub category_id: i32,
    /// Output only
    #[serde(default)]
    pub author_name: String,
    /// Output only
    #[serde(default)]
    pub category_name: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
}

impl From<BookRecord> for BookDto {
    fn from(book: BookRecord) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author_id: book.author_id,
            category_id: book.category_id,
            author_name: book.author_name,
            category_name: book.category_name,
            price: book.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dto(title: &str, price: &str) -> BookDto {
        BookDto {
            id: 0,
            title: title.to_string(),
            author_id: 1,
            category_id: 1,
            author_name: String::new(),
            category_name: String::new(),
            price: Decimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn max_price_matches_column_precision() {
        assert_eq!(MAX_PRICE, Decimal::from_str("9999999999.99").unwrap());
    }

    #[test]
    fn draft_rounds_price_and_trims_title() {
        let draft = BookDraft::from_dto(&dto("  Dune  ", "12.345"));
        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.price, Decimal::from_str("12.35").unwrap());
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn draft_rounds_midpoints_away_from_zero() {
        for (input, rounded) in [("0.125", "0.13"), ("2.675", "2.68"), ("-0.005", "-0.01")] {
            let draft = BookDraft::from_dto(&dto("Dune", input));
            assert_eq!(draft.price, Decimal::from_str(rounded).unwrap(), "{input}");
        }
    }

    #[test]
    fn draft_rejects_bad_values() {
        assert!(BookDraft::from_dto(&dto("", "1")).validate().is_err());
        assert!(BookDraft::from_dto(&dto(&"t".repeat(301), "1")).validate().is_err());
        assert!(BookDraft::from_dto(&dto("Dune", "-0.01")).validate().is_err());
        assert!(BookDraft::from_dto(&dto("Dune", "10000000000")).validate().is_err());
        assert!(BookDraft::from_dto(&dto("Free", "0")).validate().is_ok());
    }

    #[test]
    fn dto_accepts_missing_names_and_emits_number_price() {
        let parsed: BookDto = serde_json::from_str(
            r#"{"title":"Dune","authorId":1,"categoryId":2,"price":9.99}"#,
        )
        .unwrap();
        assert_eq!(parsed.category_id, 2);
        assert!(parsed.author_name.is_empty());
        assert_eq!(parsed.price, Decimal::from_str("9.99").unwrap());

        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["price"], serde_json::json!(9.99));
        assert_eq!(json["authorId"], 1);
    }
}
