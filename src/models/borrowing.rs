//! Borrowing ledger model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// One copy of a book lent to one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrowing {
    pub id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    #[serde(rename = "book")]
    pub book_id: i32,
    #[serde(rename = "user")]
    pub user_id: i32,
}

/// Borrow request body; the borrower is the authenticated caller
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBorrowing {
    /// Book ID
    pub book: i32,
    pub expected_return_date: NaiveDate,
}

/// Fully resolved borrow handed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBorrowing {
    pub book_id: i32,
    pub user_id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
}

/// Borrowing list query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BorrowingQuery {
    /// Only borrowings of this user
    pub user_id: Option<i32>,
}
