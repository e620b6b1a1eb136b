//! Borrowing ledger service

use chrono::{NaiveDate, Utc};

use crate::{
    config::ReturnPolicy,
    error::AppResult,
    models::{
        borrowing::{Borrowing, BorrowingQuery, CreateBorrowing, NewBorrowing},
        principal::{Access, Principal},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowingsService {
    repository: Repository,
    return_policy: ReturnPolicy,
}

impl BorrowingsService {
    pub fn new(repository: Repository, return_policy: ReturnPolicy) -> Self {
        Self {
            repository,
            return_policy,
        }
    }

    /// List borrowings visible to the caller.
    ///
    /// Admins see every row and may filter by user. Other callers only ever
    /// see their own rows, so filtering on someone else yields nothing.
    pub async fn list(&self, caller: &Principal, query: BorrowingQuery) -> AppResult<Vec<Borrowing>> {
        if caller.is_admin() {
            return self.repository.borrowings.list(&query).await;
        }
        match query.user_id {
            Some(user_id) if user_id != caller.user_id => Ok(Vec::new()),
            _ => {
                let own = BorrowingQuery {
                    user_id: Some(caller.user_id),
                };
                self.repository.borrowings.list(&own).await
            }
        }
    }

    pub async fn get_by_id(&self, caller: &Principal, id: i32) -> AppResult<Borrowing> {
        let borrowing = self.repository.borrowings.get_by_id(id).await?;
        Access::AuthenticatedOwner(Some(borrowing.user_id)).authorize(Some(caller))?;
        Ok(borrowing)
    }

    /// Borrow a book on behalf of the caller
    pub async fn borrow(&self, caller: &Principal, request: CreateBorrowing) -> AppResult<Borrowing> {
        self.borrow_on(caller, request, Utc::now().date_naive()).await
    }

    async fn borrow_on(
        &self,
        caller: &Principal,
        request: CreateBorrowing,
        today: NaiveDate,
    ) -> AppResult<Borrowing> {
        let new = NewBorrowing {
            book_id: request.book,
            user_id: caller.user_id,
            borrow_date: today,
            expected_return_date: request.expected_return_date,
        };

        match self.repository.borrowings.borrow(&new).await {
            Ok(borrowing) => {
                tracing::info!(
                    borrowing_id = borrowing.id,
                    book_id = borrowing.book_id,
                    user_id = borrowing.user_id,
                    "book borrowed"
                );
                Ok(borrowing)
            }
            Err(e) => {
                tracing::warn!(book_id = new.book_id, user_id = new.user_id, "borrow refused: {}", e);
                Err(e)
            }
        }
    }

    /// Return a borrowed book, subject to the configured return policy
    pub async fn return_borrowing(&self, caller: &Principal, id: i32) -> AppResult<Borrowing> {
        match self.return_policy {
            ReturnPolicy::AdminOnly => Access::Admin.authorize(Some(caller))?,
            ReturnPolicy::OwnerOrAdmin => {
                let borrowing = self.repository.borrowings.get_by_id(id).await?;
                Access::AuthenticatedOwner(Some(borrowing.user_id)).authorize(Some(caller))?;
            }
        }

        let borrowing = self.repository.borrowings.return_borrowing(id).await?;
        tracing::info!(
            borrowing_id = borrowing.id,
            book_id = borrowing.book_id,
            user_id = borrowing.user_id,
            "book returned"
        );
        Ok(borrowing)
    }
}
