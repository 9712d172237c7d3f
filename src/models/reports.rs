// src/models/reports.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    EnviadoFinanceiro,
    RecebidoFinanceiro,
    AguardandoAprovacao,
    NotaEmitida,
    AguardandoPagamento,
    Pago,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "nota_fiscal_status")]
pub enum ReportInvoiceStatus {
    Faturada,
    Paga,
    Cancelada,
}

/// Relatório de serviço (origem do recebível).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkReport {
    pub id: Uuid,
    #[schema(example = "RPT-2025-0042")]
    pub report_number: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub client_id: Uuid,
    pub total_value: Decimal,
    pub status: ReportStatus,
    pub updated_at: DateTime<Utc>,
}

/// Nota fiscal emitida a partir de um relatório.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportInvoice {
    pub id: Uuid,
    pub relatorio_id: Uuid,
    #[schema(example = "NF-001")]
    pub numero_nota: String,
    #[schema(value_type = String, format = Date)]
    pub data_emissao: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub data_vencimento: NaiveDate,
    pub valor: Decimal,
    pub status: ReportInvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
