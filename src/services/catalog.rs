//! Book catalog service

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookInput, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create(&self, book: BookInput) -> AppResult<Book> {
        book.validate()?;
        let book = self.repository.books.create(&book).await?;
        tracing::info!(book_id = book.id, title = %book.title, "book added to catalog");
        Ok(book)
    }

    /// Apply a full or partial update
    pub async fn update(&self, id: i32, changes: UpdateBook) -> AppResult<Book> {
        changes.validate()?;
        self.repository.books.update(id, &changes).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "book removed from catalog");
        Ok(())
    }
}
