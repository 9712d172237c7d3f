// src/models/invoices.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "obra_nota_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pendente,
    Pago,
    Vencido,
    Renegociado, // Qualquer edição após a emissão
}

// --- Structs ---

/// Nota fiscal de obra (`obras_notas_fiscais`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub obra_id: Uuid,

    #[schema(example = "NF-2025-001")]
    pub numero_nota: String,

    // Valores
    #[schema(example = "10000.00")]
    pub valor_nota: Decimal,
    #[schema(example = "1100.00")]
    pub desconto_inss: Decimal,
    #[schema(example = "500.00")]
    pub desconto_iss: Decimal,
    #[schema(example = "0.00")]
    pub outro_desconto: Decimal,
    #[schema(example = "8400.00")]
    pub valor_liquido: Decimal, // Sempre recalculado, nunca vem do cliente

    #[schema(value_type = String, format = Date, example = "2025-02-10")]
    pub vencimento: NaiveDate,
    pub status: InvoiceStatus,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento: Option<NaiveDate>,

    pub arquivo_nota_url: Option<String>,
    pub observacoes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceInput {
    #[validate(length(min = 1, max = 60))]
    #[schema(example = "nf-2025-001")]
    pub numero_nota: String,

    #[schema(example = "10000.00")]
    pub valor_nota: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-02-10")]
    pub vencimento: NaiveDate,

    #[serde(default)]
    pub desconto_inss: Decimal,
    #[serde(default)]
    pub desconto_iss: Decimal,
    #[serde(default)]
    pub outro_desconto: Decimal,

    #[validate(url)]
    pub arquivo_nota_url: Option<String>,
    #[validate(length(max = 2000))]
    pub observacoes: Option<String>,
}

/// Edição parcial: o que vier `None` mantém o valor salvo.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceInput {
    #[validate(length(min = 1, max = 60))]
    pub numero_nota: Option<String>,
    pub valor_nota: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub vencimento: Option<NaiveDate>,
    pub desconto_inss: Option<Decimal>,
    pub desconto_iss: Option<Decimal>,
    pub outro_desconto: Option<Decimal>,
    #[validate(url)]
    pub arquivo_nota_url: Option<String>,
    #[validate(length(max = 2000))]
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkInvoicePaidPayload {
    #[schema(value_type = String, format = Date, example = "2025-02-08")]
    pub data_pagamento: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InvoiceFilters {
    pub status: Option<InvoiceStatus>,
    /// Vencimento a partir de
    #[param(value_type = Option<String>, format = Date)]
    pub data_inicio: Option<NaiveDate>,
    /// Vencimento até
    #[param(value_type = Option<String>, format = Date)]
    pub data_fim: Option<NaiveDate>,
}

impl InvoiceFilters {
    pub fn matches(&self, nf: &Invoice) -> bool {
        self.status.is_none_or(|s| s == nf.status)
            && self.data_inicio.is_none_or(|d| nf.vencimento >= d)
            && self.data_fim.is_none_or(|d| nf.vencimento <= d)
    }
}

// --- Medições ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: Uuid,
    pub obra_id: Uuid,
    pub nota_fiscal_id: Option<Uuid>,
    #[schema(example = "Medição de janeiro - Rua das Flores")]
    pub descricao: String,
    pub arquivo_medicao_url: String,
    #[schema(value_type = String, format = Date)]
    pub data_medicao: NaiveDate,
    #[schema(example = 1)]
    pub numero_medicao: i32, // Sequencial por obra
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeasurementInput {
    pub nota_fiscal_id: Option<Uuid>,
    #[validate(length(min = 1, max = 500))]
    pub descricao: String,
    #[validate(length(min = 1))]
    pub arquivo_medicao_url: String,
    #[schema(value_type = String, format = Date)]
    pub data_medicao: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeasurementInput {
    pub nota_fiscal_id: Option<Uuid>,
    #[validate(length(min = 1, max = 500))]
    pub descricao: Option<String>,
    #[validate(length(min = 1))]
    pub arquivo_medicao_url: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_medicao: Option<NaiveDate>,
}

// --- Resumo ---

/// Notas da obra somadas pelo valor bruto, por status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub total_emitido: Decimal,
    pub total_pago: Decimal,
    pub total_pendente: Decimal,
    pub total_vencido: Decimal,
    pub total_renegociado: Decimal,
}

impl InvoiceTotals {
    pub fn record(&mut self, nf: &Invoice) {
        self.total_emitido += nf.valor_nota;
        match nf.status {
            InvoiceStatus::Pago => self.total_pago += nf.valor_nota,
            InvoiceStatus::Pendente => self.total_pendente += nf.valor_nota,
            InvoiceStatus::Vencido => self.total_vencido += nf.valor_nota,
            InvoiceStatus::Renegociado => self.total_renegociado += nf.valor_nota,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectPaymentTotals {
    pub total_pago: Decimal,
    pub quantidade: usize,
}

/// Resumo financeiro da obra.
///
/// `faturamentoTotal` = notas emitidas + pagamentos diretos;
/// `totalRecebido` = notas pagas + pagamentos diretos;
/// `totalAReceber` = notas pendentes + vencidas.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFinancialSummary {
    pub obra_id: Uuid,
    pub notas_fiscais: InvoiceTotals,
    pub pagamentos_diretos: DirectPaymentTotals,
    pub faturamento_total: Decimal,
    pub total_recebido: Decimal,
    pub total_a_receber: Decimal,
}
