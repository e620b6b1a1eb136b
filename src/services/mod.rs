//! Business logic services

pub mod borrowings;
pub mod catalog;
pub mod payments;

use crate::{config::BorrowingsConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub borrowings: borrowings::BorrowingsService,
    pub payments: payments::PaymentsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, borrowings_config: &BorrowingsConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            borrowings: borrowings::BorrowingsService::new(
                repository.clone(),
                borrowings_config.return_policy,
            ),
            payments: payments::PaymentsService::new(repository.clone()),
            repository,
        }
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.health.ping().await
    }
}
