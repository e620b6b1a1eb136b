//! Data models for the bookloan server

pub mod book;
pub mod borrowing;
pub mod payment;
pub mod principal;

// Re-export commonly used types
pub use book::{Book, BookInput, Cover, UpdateBook};
pub use borrowing::{Borrowing, BorrowingQuery, CreateBorrowing, NewBorrowing};
pub use payment::{Payment, PaymentInput, PaymentStatus, PaymentType, UpdatePayment};
pub use principal::{Access, Principal, PrincipalClaims, Role};

/// A stored two-letter code that matches no enum variant
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} code {code:?}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: String,
}
