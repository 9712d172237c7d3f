// src/handlers/direct_payments.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::direct_payments::{
        CreateDirectPaymentInput, DirectPayment, DirectPaymentFilters, UpdateDirectPaymentInput,
    },
};

// GET /api/projects/{obra_id}/direct-payments
#[utoipa::path(
    get,
    path = "/api/projects/{obra_id}/direct-payments",
    tag = "Direct Payments",
    params(
        ("obra_id" = Uuid, Path, description = "ID da obra"),
        DirectPaymentFilters
    ),
    responses(
        (status = 200, description = "Pagamentos diretos, mais recentes primeiro", body = Vec<DirectPayment>)
    )
)]
pub async fn list_direct_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(obra_id): Path<Uuid>,
    Query(filters): Query<DirectPaymentFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = app_state
        .direct_payment_service
        .list_direct_payments(obra_id, &filters)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(payments))
}

// POST /api/projects/{obra_id}/direct-payments
#[utoipa::path(
    post,
    path = "/api/projects/{obra_id}/direct-payments",
    tag = "Direct Payments",
    request_body = CreateDirectPaymentInput,
    params(("obra_id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 201, description = "Pagamento registrado", body = DirectPayment),
        (status = 422, description = "Valor deve ser maior que zero")
    )
)]
pub async fn create_direct_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(obra_id): Path<Uuid>,
    Json(payload): Json<CreateDirectPaymentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = app_state
        .direct_payment_service
        .create_direct_payment(obra_id, payload, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

// PUT /api/direct-payments/{id}
#[utoipa::path(
    put,
    path = "/api/direct-payments/{id}",
    tag = "Direct Payments",
    request_body = UpdateDirectPaymentInput,
    params(("id" = Uuid, Path, description = "ID do pagamento direto")),
    responses(
        (status = 200, description = "Pagamento atualizado", body = DirectPayment),
        (status = 404, description = "Pagamento não encontrado"),
        (status = 422, description = "Valor inválido")
    )
)]
pub async fn update_direct_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDirectPaymentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .direct_payment_service
        .update_direct_payment(id, payload, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(updated))
}

// DELETE /api/direct-payments/{id}
#[utoipa::path(
    delete,
    path = "/api/direct-payments/{id}",
    tag = "Direct Payments",
    params(("id" = Uuid, Path, description = "ID do pagamento direto")),
    responses(
        (status = 204, description = "Pagamento excluído"),
        (status = 404, description = "Pagamento não encontrado")
    )
)]
pub async fn delete_direct_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .direct_payment_service
        .delete_direct_payment(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
