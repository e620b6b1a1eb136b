//! Payment ledger service

use crate::{
    error::AppResult,
    models::payment::{Payment, PaymentInput, UpdatePayment},
    repository::Repository,
};

#[derive(Clone)]
pub struct PaymentsService {
    repository: Repository,
}

impl PaymentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Payment>> {
        self.repository.payments.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Payment> {
        self.repository.payments.get_by_id(id).await
    }

    pub async fn create(&self, payment: PaymentInput) -> AppResult<Payment> {
        self.repository.payments.create(&payment).await
    }

    pub async fn update(&self, id: i32, changes: UpdatePayment) -> AppResult<Payment> {
        self.repository.payments.update(id, &changes).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.payments.delete(id).await
    }
}
