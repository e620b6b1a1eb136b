//! In-process store used for local runs and tests.
//!
//! A single mutex guards all tables, so every operation, including the
//! borrow/return pair, is applied as one unit.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{BookStore, BorrowingStore, HealthProbe, PaymentStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        Book, BookInput, Borrowing, BorrowingQuery, NewBorrowing, Payment, PaymentInput,
        UpdateBook, UpdatePayment,
    },
};

#[derive(Default)]
struct Tables {
    books: BTreeMap<i32, Book>,
    borrowings: BTreeMap<i32, Borrowing>,
    payments: BTreeMap<i32, Payment>,
    last_book_id: i32,
    last_borrowing_id: i32,
    last_payment_id: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }
}

fn book_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Book with id {} not found", id))
}

fn check_inventory(book: &Book) -> AppResult<()> {
    if book.inventory < 0 {
        return Err(AppError::invalid_field(
            "inventory",
            "Inventory must not be negative",
        ));
    }
    Ok(())
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.lock()?.books.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.lock()?
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| book_not_found(id))
    }

    async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let mut tables = self.lock()?;
        let book = Book {
            id: tables.last_book_id + 1,
            title: input.title.clone(),
            author: input.author.clone(),
            cover: input.cover,
            inventory: input.inventory,
            daily_fee: input.daily_fee,
        };
        check_inventory(&book)?;
        tables.last_book_id = book.id;
        tables.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(&self, id: i32, changes: &UpdateBook) -> AppResult<Book> {
        let mut tables = self.lock()?;
        let mut book = tables.books.get(&id).cloned().ok_or_else(|| book_not_found(id))?;
        changes.apply_to(&mut book);
        check_inventory(&book)?;
        tables.books.insert(id, book.clone());
        Ok(book)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.lock()?;
        tables.books.remove(&id).ok_or_else(|| book_not_found(id))?;
        tables.borrowings.retain(|_, b| b.book_id != id);
        Ok(())
    }
}

#[async_trait]
impl BorrowingStore for MemoryStore {
    async fn list(&self, query: &BorrowingQuery) -> AppResult<Vec<Borrowing>> {
        Ok(self
            .lock()?
            .borrowings
            .values()
            .filter(|b| query.user_id.map_or(true, |user_id| b.user_id == user_id))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Borrowing> {
        self.lock()?
            .borrowings
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))
    }

    async fn borrow(&self, new: &NewBorrowing) -> AppResult<Borrowing> {
        let mut tables = self.lock()?;
        let tables = &mut *tables;

        let book = tables.books.get_mut(&new.book_id).ok_or_else(|| {
            AppError::invalid_field("book", format!("Book with id {} does not exist", new.book_id))
        })?;
        if book.inventory < 1 {
            return Err(AppError::book_not_available(new.book_id));
        }
        book.inventory -= 1;

        tables.last_borrowing_id += 1;
        let borrowing = Borrowing {
            id: tables.last_borrowing_id,
            borrow_date: new.borrow_date,
            expected_return_date: new.expected_return_date,
            actual_return_date: None,
            book_id: new.book_id,
            user_id: new.user_id,
        };
        tables.borrowings.insert(borrowing.id, borrowing.clone());
        Ok(borrowing)
    }

    async fn return_borrowing(&self, id: i32) -> AppResult<Borrowing> {
        let mut tables = self.lock()?;
        let tables = &mut *tables;

        let borrowing = tables
            .borrowings
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))?;
        if let Some(book) = tables.books.get_mut(&borrowing.book_id) {
            book.inventory = book
                .inventory
                .checked_add(1)
                .ok_or_else(AppError::inventory_overflow)?;
        }
        tables.borrowings.remove(&id);
        Ok(borrowing)
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Payment>> {
        Ok(self.lock()?.payments.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Payment> {
        self.lock()?
            .payments
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Payment with id {} not found", id)))
    }

    async fn create(&self, input: &PaymentInput) -> AppResult<Payment> {
        let mut tables = self.lock()?;
        tables.last_payment_id += 1;
        let payment = Payment {
            id: tables.last_payment_id,
            status: input.status,
            payment_type: input.payment_type,
        };
        tables.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn update(&self, id: i32, changes: &UpdatePayment) -> AppResult<Payment> {
        let mut tables = self.lock()?;
        let payment = tables
            .payments
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Payment with id {} not found", id)))?;
        changes.apply_to(payment);
        Ok(payment.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        self.lock()?
            .payments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Payment with id {} not found", id)))
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }
}
