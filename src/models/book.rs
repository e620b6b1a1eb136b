//! Book catalog model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::UnknownCode;

/// Cover binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Cover {
    #[serde(rename = "HR")]
    Hard,
    #[serde(rename = "ST")]
    Soft,
}

impl Cover {
    pub fn as_code(&self) -> &'static str {
        match self {
            Cover::Hard => "HR",
            Cover::Soft => "ST",
        }
    }
}

impl TryFrom<String> for Cover {
    type Error = UnknownCode;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        match code.as_str() {
            "HR" => Ok(Cover::Hard),
            "ST" => Ok(Cover::Soft),
            _ => Err(UnknownCode { kind: "cover", code }),
        }
    }
}

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    #[sqlx(try_from = "String")]
    pub cover: Cover,
    /// Copies currently available to borrow
    pub inventory: i32,
    /// Rental fee per day, two fractional digits
    #[schema(value_type = String, example = "1.99")]
    pub daily_fee: Decimal,
}

pub fn validate_daily_fee(fee: &Decimal) -> Result<(), ValidationError> {
    if fee.is_sign_negative() || fee.is_zero() {
        let mut err = ValidationError::new("daily_fee_not_positive");
        err.message = Some("Daily fee must be greater than zero".into());
        return Err(err);
    }
    if fee.normalize().scale() > 2 {
        let mut err = ValidationError::new("daily_fee_scale");
        err.message = Some("Daily fee must have at most 2 decimal places".into());
        return Err(err);
    }
    // NUMERIC(4,2) tops out at 99.99
    if *fee > Decimal::new(9999, 2) {
        let mut err = ValidationError::new("daily_fee_too_large");
        err.message = Some("Daily fee must be below 100.00".into());
        return Err(err);
    }
    Ok(())
}

/// Create or replace book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(length(max = 255, message = "Author must be at most 255 characters"))]
    pub author: String,
    pub cover: Cover,
    #[validate(range(min = 0, message = "Inventory must not be negative"))]
    pub inventory: i32,
    #[validate(custom(function = "validate_daily_fee"))]
    #[schema(value_type = String, example = "1.99")]
    pub daily_fee: Decimal,
}

/// Partial update request; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 255, message = "Author must be at most 255 characters"))]
    pub author: Option<String>,
    pub cover: Option<Cover>,
    #[validate(range(min = 0, message = "Inventory must not be negative"))]
    pub inventory: Option<i32>,
    #[validate(custom(function = "validate_daily_fee"))]
    #[schema(value_type = Option<String>, example = "1.99")]
    pub daily_fee: Option<Decimal>,
}

impl From<BookInput> for UpdateBook {
    fn from(input: BookInput) -> Self {
        Self {
            title: Some(input.title),
            author: Some(input.author),
            cover: Some(input.cover),
            inventory: Some(input.inventory),
            daily_fee: Some(input.daily_fee),
        }
    }
}

impl UpdateBook {
    /// Apply the present fields onto an existing record
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(cover) = self.cover {
            book.cover = cover;
        }
        if let Some(inventory) = self.inventory {
            book.inventory = inventory;
        }
        if let Some(daily_fee) = self.daily_fee {
            book.daily_fee = daily_fee;
        }
    }
}
