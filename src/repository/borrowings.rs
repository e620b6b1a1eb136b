//! Borrowings repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::BorrowingStore;
use crate::{
    error::{AppError, AppResult},
    models::borrowing::{Borrowing, BorrowingQuery, NewBorrowing},
};

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowingStore for BorrowingsRepository {
    async fn list(&self, query: &BorrowingQuery) -> AppResult<Vec<Borrowing>> {
        let borrowings = sqlx::query_as::<_, Borrowing>(
            r#"
            SELECT * FROM borrowings
            WHERE ($1::INT IS NULL OR user_id = $1)
            ORDER BY id
            "#,
        )
        .bind(query.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(borrowings)
    }

    /// Get borrowing by ID
    async fn get_by_id(&self, id: i32) -> AppResult<Borrowing> {
        sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))
    }

    async fn borrow(&self, new: &NewBorrowing) -> AppResult<Borrowing> {
        // Dropping `tx` on any early return rolls back.
        let mut tx = self.pool.begin().await?;

        // Row lock: concurrent borrows of the same book queue up here.
        let inventory: i32 = sqlx::query_scalar(
            "SELECT inventory FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(new.book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::invalid_field("book", format!("Book with id {} does not exist", new.book_id))
        })?;

        if inventory < 1 {
            return Err(AppError::book_not_available(new.book_id));
        }

        sqlx::query("UPDATE books SET inventory = inventory - 1 WHERE id = $1")
            .bind(new.book_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from_write)?;

        let borrowing = sqlx::query_as::<_, Borrowing>(
            r#"
            INSERT INTO borrowings (borrow_date, expected_return_date, book_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new.borrow_date)
        .bind(new.expected_return_date)
        .bind(new.book_id)
        .bind(new.user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(borrowing)
    }

    async fn return_borrowing(&self, id: i32) -> AppResult<Borrowing> {
        let mut tx = self.pool.begin().await?;

        let borrowing = sqlx::query_as::<_, Borrowing>(
            "DELETE FROM borrowings WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))?;

        sqlx::query("UPDATE books SET inventory = inventory + 1 WHERE id = $1")
            .bind(borrowing.book_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from_write)?;

        tx.commit().await?;

        Ok(borrowing)
    }
}
