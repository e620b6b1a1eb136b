//! Borrowing endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::borrowing::{Borrowing, BorrowingQuery, CreateBorrowing},
};

use super::{AuthenticatedUser, JsonBody, PathParam};

/// List borrowings; members only see their own
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(BorrowingQuery),
    responses(
        (status = 200, description = "Visible borrowings", body = Vec<Borrowing>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(query): Query<BorrowingQuery>,
) -> AppResult<Json<Vec<Borrowing>>> {
    let borrowings = state.services.borrowings.list(&caller, query).await?;
    Ok(Json(borrowings))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowing,
    responses(
        (status = 201, description = "Book borrowed", body = Borrowing),
        (status = 400, description = "Book missing or not available", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    JsonBody(request): JsonBody<CreateBorrowing>,
) -> AppResult<(StatusCode, Json<Borrowing>)> {
    let borrowing = state.services.borrowings.borrow(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(borrowing)))
}

/// Get borrowing by ID
#[utoipa::path(
    get,
    path = "/borrowings/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrowing ID")),
    responses(
        (status = 200, description = "Borrowing details", body = Borrowing),
        (status = 403, description = "Borrowing belongs to another user"),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn get_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<Borrowing>> {
    let borrowing = state.services.borrowings.get_by_id(&caller, id).await?;
    Ok(Json(borrowing))
}

/// Return a borrowed book
#[utoipa::path(
    delete,
    path = "/borrowings/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrowing ID")),
    responses(
        (status = 204, description = "Book returned"),
        (status = 403, description = "Caller may not return this borrowing"),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn return_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<StatusCode> {
    state.services.borrowings.return_borrowing(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
