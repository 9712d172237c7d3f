// src/handlers/invoices.rs

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
    models::invoices::{
        CreateInvoiceInput, CreateMeasurementInput, Invoice, InvoiceFilters, MarkInvoicePaidPayload,
        Measurement, ProjectFinancialSummary, UpdateInvoiceInput, UpdateMeasurementInput,
    },
};

// =============================================================================
//  NOTAS FISCAIS
// =============================================================================

// GET /api/projects/{obra_id}/invoices
#[utoipa::path(
    get,
    path = "/api/projects/{obra_id}/invoices",
    tag = "Invoices",
    params(
        ("obra_id" = Uuid, Path, description = "ID da obra"),
        InvoiceFilters
    ),
    responses(
        (status = 200, description = "Notas da obra (pendentes vencidas já marcadas)", body = Vec<Invoice>)
    )
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(obra_id): Path<Uuid>,
    Query(filters): Query<InvoiceFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let invoices = app_state
        .invoice_service
        .list_invoices(obra_id, &filters, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(invoices))
}

// POST /api/projects/{obra_id}/invoices
#[utoipa::path(
    post,
    path = "/api/projects/{obra_id}/invoices",
    tag = "Invoices",
    request_body = CreateInvoiceInput,
    params(("obra_id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 201, description = "Nota criada", body = Invoice),
        (status = 422, description = "Descontos inválidos")
    )
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(obra_id): Path<Uuid>,
    Json(payload): Json<CreateInvoiceInput>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .create_invoice(obra_id, payload, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

// GET /api/invoices/{id}
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota fiscal", body = Invoice),
        (status = 404, description = "Nota não encontrada")
    )
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .get_invoice(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(invoice))
}

// PUT /api/invoices/{id}
#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    request_body = UpdateInvoiceInput,
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota editada (status renegociado)", body = Invoice),
        (status = 404, description = "Nota não encontrada"),
        (status = 422, description = "Descontos inválidos")
    )
)]
pub async fn update_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceInput>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .update_invoice(id, payload, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(invoice))
}

// POST /api/invoices/{id}/pay
#[utoipa::path(
    post,
    path = "/api/invoices/{id}/pay",
    tag = "Invoices",
    request_body = MarkInvoicePaidPayload,
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota marcada como paga", body = Invoice),
        (status = 404, description = "Nota não encontrada")
    )
)]
pub async fn mark_invoice_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarkInvoicePaidPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .mark_invoice_paid(id, payload.data_pagamento, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(invoice))
}

// DELETE /api/invoices/{id}
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 204, description = "Nota excluída"),
        (status = 404, description = "Nota não encontrada"),
        (status = 409, description = "Nota possui medições vinculadas")
    )
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .invoice_service
        .delete_invoice(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/projects/{obra_id}/summary
#[utoipa::path(
    get,
    path = "/api/projects/{obra_id}/summary",
    tag = "Invoices",
    params(("obra_id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 200, description = "Resumo financeiro da obra: notas por status e pagamentos diretos", body = ProjectFinancialSummary)
    )
)]
pub async fn project_financial_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(obra_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .invoice_service
        .project_financial_summary(obra_id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(summary))
}

// =============================================================================
//  MEDIÇÕES
// =============================================================================

// GET /api/projects/{obra_id}/measurements
#[utoipa::path(
    get,
    path = "/api/projects/{obra_id}/measurements",
    tag = "Measurements",
    params(("obra_id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 200, description = "Medições da obra, em ordem de número", body = Vec<Measurement>)
    )
)]
pub async fn list_measurements(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(obra_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let medicoes = app_state
        .invoice_service
        .list_measurements(obra_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(medicoes))
}

// POST /api/projects/{obra_id}/measurements
#[utoipa::path(
    post,
    path = "/api/projects/{obra_id}/measurements",
    tag = "Measurements",
    request_body = CreateMeasurementInput,
    params(("obra_id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 201, description = "Medição criada", body = Measurement)
    )
)]
pub async fn create_measurement(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(obra_id): Path<Uuid>,
    Json(payload): Json<CreateMeasurementInput>,
) -> Result<impl IntoResponse, ApiError> {
    let medicao = app_state
        .invoice_service
        .create_measurement(obra_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(medicao)))
}

// GET /api/invoices/{id}/measurements
#[utoipa::path(
    get,
    path = "/api/invoices/{id}/measurements",
    tag = "Measurements",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Medições vinculadas à nota", body = Vec<Measurement>)
    )
)]
pub async fn list_measurements_by_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let medicoes = app_state
        .invoice_service
        .list_measurements_by_invoice(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(medicoes))
}

// GET /api/measurements/{id}
#[utoipa::path(
    get,
    path = "/api/measurements/{id}",
    tag = "Measurements",
    params(("id" = Uuid, Path, description = "ID da medição")),
    responses(
        (status = 200, description = "Medição", body = Measurement),
        (status = 404, description = "Medição não encontrada")
    )
)]
pub async fn get_measurement(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let medicao = app_state
        .invoice_service
        .get_measurement(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(medicao))
}

// PUT /api/measurements/{id}
#[utoipa::path(
    put,
    path = "/api/measurements/{id}",
    tag = "Measurements",
    request_body = UpdateMeasurementInput,
    params(("id" = Uuid, Path, description = "ID da medição")),
    responses(
        (status = 200, description = "Medição atualizada", body = Measurement),
        (status = 404, description = "Medição ou nota fiscal não encontrada")
    )
)]
pub async fn update_measurement(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMeasurementInput>,
) -> Result<impl IntoResponse, ApiError> {
    let medicao = app_state
        .invoice_service
        .update_measurement(id, payload, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(medicao))
}

// DELETE /api/measurements/{id}
#[utoipa::path(
    delete,
    path = "/api/measurements/{id}",
    tag = "Measurements",
    params(("id" = Uuid, Path, description = "ID da medição")),
    responses(
        (status = 204, description = "Medição excluída"),
        (status = 404, description = "Medição não encontrada")
    )
)]
pub async fn delete_measurement(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .invoice_service
        .delete_measurement(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
