//! Payments repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::PaymentStore;
use crate::{
    error::{AppError, AppResult},
    models::payment::{Payment, PaymentInput, UpdatePayment},
};

#[derive(Clone)]
pub struct PaymentsRepository {
    pool: Pool<Postgres>,
}

impl PaymentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PaymentsRepository {
    async fn list(&self) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>("SELECT * FROM payments ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(payments)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment with id {} not found", id)))
    }

    async fn create(&self, payment: &PaymentInput) -> AppResult<Payment> {
        let row = sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (status, payment_type) VALUES ($1, $2) RETURNING *",
        )
        .bind(payment.status.as_code())
        .bind(payment.payment_type.as_code())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i32, changes: &UpdatePayment) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments SET
                status = COALESCE($2, status),
                payment_type = COALESCE($3, payment_type)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.status.map(|s| s.as_code()))
        .bind(changes.payment_type.map(|t| t.as_code()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payment with id {} not found", id)))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Payment with id {} not found", id)));
        }
        Ok(())
    }
}
