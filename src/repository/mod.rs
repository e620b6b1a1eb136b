//! Repository layer: persistence ports and their adapters
//!
//! Services depend on the `*Store` traits only. [`Repository`] bundles one
//! implementation of each, backed either by PostgreSQL or by process memory.

pub mod books;
pub mod borrowings;
pub mod memory;
pub mod payments;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        Book, BookInput, Borrowing, BorrowingQuery, NewBorrowing, Payment, PaymentInput,
        UpdateBook, UpdatePayment,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Book>>;
    async fn get_by_id(&self, id: i32) -> AppResult<Book>;
    async fn create(&self, book: &BookInput) -> AppResult<Book>;
    async fn update(&self, id: i32, changes: &UpdateBook) -> AppResult<Book>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Borrowing ledger port.
///
/// `borrow` and `return_borrowing` are atomic: the inventory change and the
/// ledger change commit together or not at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowingStore: Send + Sync {
    async fn list(&self, query: &BorrowingQuery) -> AppResult<Vec<Borrowing>>;
    async fn get_by_id(&self, id: i32) -> AppResult<Borrowing>;
    /// Take one copy of the book and record the borrowing.
    /// Fails without side effects when the book is missing or exhausted.
    async fn borrow(&self, borrowing: &NewBorrowing) -> AppResult<Borrowing>;
    /// Remove the borrowing and put its copy back on the shelf
    async fn return_borrowing(&self, id: i32) -> AppResult<Borrowing>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Payment>>;
    async fn get_by_id(&self, id: i32) -> AppResult<Payment>;
    async fn create(&self, payment: &PaymentInput) -> AppResult<Payment>;
    async fn update(&self, id: i32, changes: &UpdatePayment) -> AppResult<Payment>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Store liveness probe for readiness checks
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding one adapter per port
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub borrowings: Arc<dyn BorrowingStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub health: Arc<dyn HealthProbe>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            borrowings: Arc::new(borrowings::BorrowingsRepository::new(pool.clone())),
            payments: Arc::new(payments::PaymentsRepository::new(pool.clone())),
            health: Arc::new(PoolProbe { pool }),
        }
    }

    /// Create a repository keeping everything in process memory
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            books: store.clone(),
            borrowings: store.clone(),
            payments: store.clone(),
            health: store,
        }
    }
}

struct PoolProbe {
    pool: Pool<Postgres>,
}

#[async_trait]
impl HealthProbe for PoolProbe {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
