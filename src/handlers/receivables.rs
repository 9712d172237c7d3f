// src/handlers/receivables.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::receivables::{
        CreateReceivableInput, MarkAsPaidPayload, ReceivableDetail, ReceivableQuery, ReceivableStats,
        SettlementOutcome, UpdatePaymentMethodPayload, UpdateReceivableInput,
    },
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepResponse {
    #[schema(example = 3)]
    pub atualizados: u64,
}

// GET /api/receivables
#[utoipa::path(
    get,
    path = "/api/receivables",
    tag = "Receivables",
    params(ReceivableQuery),
    responses(
        (status = 200, description = "Pagamentos a receber (após varredura de vencimentos)", body = Vec<ReceivableDetail>)
    )
)]
pub async fn list_receivables(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ReceivableQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let receivables = app_state
        .receivables_service
        .list_receivables(&query.into(), Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(receivables))
}

// POST /api/receivables
#[utoipa::path(
    post,
    path = "/api/receivables",
    tag = "Receivables",
    request_body = CreateReceivableInput,
    responses(
        (status = 201, description = "Pagamento criado", body = ReceivableDetail),
        (status = 422, description = "Prazo ou valor inválido")
    )
)]
pub async fn create_receivable(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateReceivableInput>,
) -> Result<impl IntoResponse, ApiError> {
    let created = app_state
        .receivables_service
        .create_receivable(payload, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/receivables/{id}
#[utoipa::path(
    get,
    path = "/api/receivables/{id}",
    tag = "Receivables",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Visão integrada do pagamento", body = ReceivableDetail),
        (status = 404, description = "Pagamento não encontrado")
    )
)]
pub async fn get_receivable(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .receivables_service
        .get_receivable(id, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(detail))
}

// PUT /api/receivables/{id}
#[utoipa::path(
    put,
    path = "/api/receivables/{id}",
    tag = "Receivables",
    request_body = UpdateReceivableInput,
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento atualizado", body = ReceivableDetail),
        (status = 404, description = "Pagamento não encontrado"),
        (status = 422, description = "Prazo ou valor inválido")
    )
)]
pub async fn update_receivable(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReceivableInput>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .receivables_service
        .update_receivable(id, payload, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(detail))
}

// DELETE /api/receivables/{id}
#[utoipa::path(
    delete,
    path = "/api/receivables/{id}",
    tag = "Receivables",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 204, description = "Pagamento excluído"),
        (status = 404, description = "Pagamento não encontrado")
    )
)]
pub async fn delete_receivable(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .receivables_service
        .delete_receivable(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/receivables/stats
#[utoipa::path(
    get,
    path = "/api/receivables/stats",
    tag = "Receivables",
    responses(
        (status = 200, description = "Quantidade e valor por status", body = ReceivableStats)
    )
)]
pub async fn receivable_stats(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .receivables_service
        .receivable_stats(Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(stats))
}

// POST /api/receivables/sweep
#[utoipa::path(
    post,
    path = "/api/receivables/sweep",
    tag = "Receivables",
    responses(
        (status = 200, description = "Status recalculados pela data de hoje", body = SweepResponse)
    )
)]
pub async fn sweep_receivables(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let atualizados = app_state
        .receivables_service
        .sweep_statuses(Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(SweepResponse { atualizados }))
}

// POST /api/receivables/{id}/pay
#[utoipa::path(
    post,
    path = "/api/receivables/{id}/pay",
    tag = "Receivables",
    request_body = MarkAsPaidPayload,
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento baixado. Falhas ao sincronizar relatório/notas vêm em `avisos`", body = SettlementOutcome),
        (status = 404, description = "Pagamento não encontrado")
    )
)]
pub async fn mark_receivable_as_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarkAsPaidPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let outcome = app_state
        .settlement_service
        .mark_receivable_as_paid(id, payload.observacao, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(outcome))
}

// PUT /api/receivables/{id}/payment-method
#[utoipa::path(
    put,
    path = "/api/receivables/{id}/payment-method",
    tag = "Receivables",
    request_body = UpdatePaymentMethodPayload,
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Forma de pagamento atualizada", body = ReceivableDetail),
        (status = 404, description = "Pagamento não encontrado")
    )
)]
pub async fn update_payment_method(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentMethodPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .settlement_service
        .update_payment_method(id, payload.forma_pagamento, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(detail))
}
