// src/handlers/schedule.rs

use axum::{extract::Query, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::status_rules::compute_remaining_text;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RemainingTimeQuery {
    /// Início da programação (RFC 3339)
    #[param(value_type = String, format = DateTime, example = "2025-01-10T14:30:00Z")]
    pub target: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemainingTimeResponse {
    #[schema(value_type = String, format = DateTime)]
    pub target: DateTime<Utc>,
    #[schema(example = "2h 10min")]
    pub tempo_restante: String,
}

// GET /api/schedule/remaining-time
#[utoipa::path(
    get,
    path = "/api/schedule/remaining-time",
    tag = "Schedule",
    params(RemainingTimeQuery),
    responses(
        (status = 200, description = "Tempo até a próxima programação", body = RemainingTimeResponse)
    )
)]
pub async fn remaining_time(Query(query): Query<RemainingTimeQuery>) -> impl IntoResponse {
    Json(RemainingTimeResponse {
        target: query.target,
        tempo_restante: compute_remaining_text(query.target, Utc::now()),
    })
}
