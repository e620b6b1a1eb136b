//! Book catalog endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookInput, UpdateBook},
};

use super::{read_access, AdminUser, JsonBody, MaybeUser, PathParam};

/// List books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 401, description = "Not authenticated and anonymous reads disabled")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    MaybeUser(caller): MaybeUser,
) -> AppResult<Json<Vec<Book>>> {
    read_access(&state).authorize(caller.as_ref())?;
    let books = state.services.catalog.list().await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    MaybeUser(caller): MaybeUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<Book>> {
    read_access(&state).authorize(caller.as_ref())?;
    let book = state.services.catalog.get_by_id(id).await?;
    Ok(Json(book))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid book", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrator rights required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    JsonBody(book): JsonBody<BookInput>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.create(book).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid book", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrator rights required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    PathParam(id): PathParam<i32>,
    JsonBody(book): JsonBody<BookInput>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.update(id, book.into()).await?;
    Ok(Json(book))
}

/// Update some fields of a book
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid book", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrator rights required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn partial_update_book(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    PathParam(id): PathParam<i32>,
    JsonBody(changes): JsonBody<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.update(id, changes).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Administrator rights required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
