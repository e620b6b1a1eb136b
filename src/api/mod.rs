//! API handlers for the bookloan REST endpoints

pub mod books;
pub mod borrowings;
pub mod health;
pub mod openapi;
pub mod payments;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::request::Parts,
    routing::get,
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::principal::{Access, Principal, PrincipalClaims},
    AppState,
};

/// Extractor for an authenticated caller; rejects with 401 when absent
pub struct AuthenticatedUser(pub Principal);

/// Extractor for an optional caller. A missing header yields `None`, a
/// malformed or invalid token is still rejected.
pub struct MaybeUser(pub Option<Principal>);

async fn bearer_principal(parts: &mut Parts, state: &AppState) -> Result<Option<Principal>, AppError> {
    let header =
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
            Ok(TypedHeader(header)) => header,
            Err(rejection) if rejection.is_missing() => return Ok(None),
            Err(_) => {
                return Err(AppError::Authentication(
                    "Invalid authorization header format".to_string(),
                ))
            }
        };

    let claims = PrincipalClaims::from_token(header.token(), &state.config.auth.jwt_secret)
        .map_err(|e| AppError::Authentication(e.to_string()))?;

    Ok(Some(claims.principal()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        bearer_principal(parts, state)
            .await?
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(bearer_principal(parts, state).await?))
    }
}

/// Extractor for an administrator. The role is checked from the request
/// head, so non-admins get 403 before any body is parsed.
pub struct AdminUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(principal) = AuthenticatedUser::from_request_parts(parts, state).await?;
        Access::Admin.authorize(Some(&principal))?;
        Ok(AdminUser(principal))
    }
}

/// Path parameters whose rejections are reported as 400 validation errors
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// JSON request body whose rejections are reported as 400 validation errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Read policy for books and payments
pub(crate) fn read_access(state: &AppState) -> Access {
    Access::Public {
        anonymous: state.config.auth.anonymous_read,
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Book catalog
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .patch(books::partial_update_book)
                .delete(books::delete_book),
        )
        // Borrowings
        .route(
            "/borrowings",
            get(borrowings::list_borrowings).post(borrowings::create_borrowing),
        )
        .route(
            "/borrowings/:id",
            get(borrowings::get_borrowing).delete(borrowings::return_borrowing),
        )
        // Payments
        .route("/payments", get(payments::list_payments).post(payments::create_payment))
        .route(
            "/payments/:id",
            get(payments::get_payment)
                .put(payments::update_payment)
                .patch(payments::partial_update_payment)
                .delete(payments::delete_payment),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
