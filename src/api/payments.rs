//! Payment ledger endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::payment::{Payment, PaymentInput, UpdatePayment},
};

use super::{read_access, AdminUser, JsonBody, MaybeUser, PathParam};

/// List payments
#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    responses(
        (status = 200, description = "All payments", body = Vec<Payment>)
    )
)]
pub async fn list_payments(
    State(state): State<crate::AppState>,
    MaybeUser(caller): MaybeUser,
) -> AppResult<Json<Vec<Payment>>> {
    read_access(&state).authorize(caller.as_ref())?;
    let payments = state.services.payments.list().await?;
    Ok(Json(payments))
}

/// Get payment by ID
#[utoipa::path(
    get,
    path = "/payments/{id}",
    tag = "payments",
    params(("id" = i32, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment details", body = Payment),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn get_payment(
    State(state): State<crate::AppState>,
    MaybeUser(caller): MaybeUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<Payment>> {
    read_access(&state).authorize(caller.as_ref())?;
    let payment = state.services.payments.get_by_id(id).await?;
    Ok(Json(payment))
}

/// Record a payment or fine
#[utoipa::path(
    post,
    path = "/payments",
    tag = "payments",
    security(("bearer_auth" = [])),
    request_body = PaymentInput,
    responses(
        (status = 201, description = "Payment created", body = Payment),
        (status = 403, description = "Administrator rights required")
    )
)]
pub async fn create_payment(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    JsonBody(payment): JsonBody<PaymentInput>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let payment = state.services.payments.create(payment).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Replace a payment
#[utoipa::path(
    put,
    path = "/payments/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Payment ID")),
    request_body = PaymentInput,
    responses(
        (status = 200, description = "Payment updated", body = Payment),
        (status = 403, description = "Administrator rights required"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn update_payment(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payment): JsonBody<PaymentInput>,
) -> AppResult<Json<Payment>> {
    let payment = state.services.payments.update(id, payment.into()).await?;
    Ok(Json(payment))
}

/// Update the status or type of a payment
#[utoipa::path(
    patch,
    path = "/payments/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Payment ID")),
    request_body = UpdatePayment,
    responses(
        (status = 200, description = "Payment updated", body = Payment),
        (status = 403, description = "Administrator rights required"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn partial_update_payment(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    PathParam(id): PathParam<i32>,
    JsonBody(changes): JsonBody<UpdatePayment>,
) -> AppResult<Json<Payment>> {
    let payment = state.services.payments.update(id, changes).await?;
    Ok(Json(payment))
}

/// Delete a payment
#[utoipa::path(
    delete,
    path = "/payments/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Payment ID")),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 403, description = "Administrator rights required"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn delete_payment(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    PathParam(id): PathParam<i32>,
) -> AppResult<StatusCode> {
    state.services.payments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
