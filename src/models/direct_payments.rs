// src/models/direct_payments.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "forma_pagamento_direto", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DirectPaymentMethod {
    Pix,
    Transferencia,
    Dinheiro,
    Cheque,
}

/// Pagamento recebido fora de nota fiscal. O valor já é líquido.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectPayment {
    pub id: Uuid,
    pub obra_id: Uuid,
    #[schema(example = "PIX - Avanço de Pagamento")]
    pub descricao: String,
    #[schema(example = "15000.00")]
    pub valor: Decimal,
    #[schema(value_type = String, format = Date, example = "2025-01-15")]
    pub data_pagamento: NaiveDate,
    pub forma_pagamento: DirectPaymentMethod,
    pub comprovante_url: Option<String>,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDirectPaymentInput {
    #[validate(length(min = 1, max = 300, message = "A descrição é obrigatória"))]
    pub descricao: String,
    #[schema(example = "15000.00")]
    pub valor: Decimal,
    #[schema(value_type = String, format = Date)]
    pub data_pagamento: NaiveDate,
    pub forma_pagamento: DirectPaymentMethod,
    #[validate(url)]
    pub comprovante_url: Option<String>,
    #[validate(length(max = 2000))]
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDirectPaymentInput {
    #[validate(length(min = 1, max = 300, message = "A descrição é obrigatória"))]
    pub descricao: Option<String>,
    pub valor: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_pagamento: Option<NaiveDate>,
    pub forma_pagamento: Option<DirectPaymentMethod>,
    #[validate(url)]
    pub comprovante_url: Option<String>,
    #[validate(length(max = 2000))]
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DirectPaymentFilters {
    pub forma_pagamento: Option<DirectPaymentMethod>,
    #[param(value_type = Option<String>, format = Date)]
    pub data_inicio: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub data_fim: Option<NaiveDate>,
}

impl DirectPaymentFilters {
    pub fn matches(&self, p: &DirectPayment) -> bool {
        self.forma_pagamento.is_none_or(|f| f == p.forma_pagamento)
            && self.data_inicio.is_none_or(|d| p.data_pagamento >= d)
            && self.data_fim.is_none_or(|d| p.data_pagamento <= d)
    }
}
