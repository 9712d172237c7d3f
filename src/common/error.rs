// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::i18n::Locale;

// Nosso tipo de erro, agora com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Regras das notas fiscais ---
    #[error("Desconto negativo")]
    InvalidDeduction,

    #[error("Descontos ({total}) maiores que o valor bruto ({gross})")]
    DeductionsExceedGross { total: Decimal, gross: Decimal },

    #[error("Número da nota fiscal vazio")]
    InvalidInvoiceNumber,

    // --- Regras dos recebíveis ---
    #[error("Prazo ausente (data ou dias)")]
    MissingDueDate,

    #[error("Prazo definido por data e por dias ao mesmo tempo")]
    ConflictingDueDate,

    #[error("Valor inválido para o campo {0}")]
    InvalidAmount(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Nota fiscal {0} possui medições vinculadas")]
    InvoiceHasMeasurements(Uuid),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Falha da fonte de dados que não vem do sqlx (ex: fixtures)
    #[error("Fonte de dados indisponível: {0}")]
    StoreUnavailable(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

/// Erro já traduzido, pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidDeduction
            | AppError::DeductionsExceedGross { .. }
            | AppError::InvalidInvoiceNumber
            | AppError::MissingDueDate
            | AppError::ConflictingDueDate
            | AppError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvoiceHasMeasurements(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::StoreUnavailable(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código estável para o frontend (não depende do idioma).
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InvalidDeduction => "INVALID_DEDUCTION",
            AppError::DeductionsExceedGross { .. } => "DEDUCTIONS_EXCEED_GROSS",
            AppError::InvalidInvoiceNumber => "INVALID_INVOICE_NUMBER",
            AppError::MissingDueDate => "MISSING_DUE_DATE",
            AppError::ConflictingDueDate => "CONFLICTING_DUE_DATE",
            AppError::InvalidAmount(_) => "INVALID_AMOUNT",
            AppError::ResourceNotFound(_) => "NOT_FOUND",
            AppError::InvoiceHasMeasurements(_) => "INVOICE_HAS_MEASUREMENTS",
            AppError::DatabaseError(_)
            | AppError::StoreUnavailable(_)
            | AppError::InternalServerError(_) => "PERSISTENCE_FAILURE",
        }
    }

    fn message(&self, lang: &str) -> String {
        let pt = lang != "en";
        match self {
            AppError::ValidationError(_) => {
                if pt { "Um ou mais campos são inválidos.".into() } else { "One or more fields are invalid.".into() }
            }
            AppError::InvalidDeduction => {
                if pt {
                    "Os valores dos descontos não podem ser negativos.".into()
                } else {
                    "Deduction values cannot be negative.".into()
                }
            }
            AppError::DeductionsExceedGross { total, gross } => {
                if pt {
                    format!("A soma dos descontos ({total}) não pode ser maior que o valor bruto da nota ({gross}).")
                } else {
                    format!("The sum of deductions ({total}) cannot exceed the invoice gross value ({gross}).")
                }
            }
            AppError::InvalidInvoiceNumber => {
                if pt { "O número da nota fiscal é obrigatório.".into() } else { "Invoice number is required.".into() }
            }
            AppError::MissingDueDate => {
                if pt { "Defina um prazo (data ou dias).".into() } else { "A due date or a number of days is required.".into() }
            }
            AppError::ConflictingDueDate => {
                if pt {
                    "Defina apenas prazo por data OU por dias.".into()
                } else {
                    "Set either a due date or a number of days, not both.".into()
                }
            }
            AppError::InvalidAmount(field) => {
                if pt {
                    format!("O campo '{field}' deve ser maior que zero.")
                } else {
                    format!("Field '{field}' must be greater than zero.")
                }
            }
            AppError::ResourceNotFound(what) => {
                if pt { format!("{what} não encontrado.") } else { format!("{what} not found.") }
            }
            AppError::InvoiceHasMeasurements(_) => {
                if pt {
                    "Não é possível excluir uma nota fiscal que possui medições vinculadas.".into()
                } else {
                    "An invoice with linked measurements cannot be deleted.".into()
                }
            }
            AppError::DatabaseError(_) | AppError::StoreUnavailable(_) | AppError::InternalServerError(_) => {
                if pt { "Ocorreu um erro inesperado.".into() } else { "An unexpected error occurred.".into() }
            }
        }
    }

    /// Traduz o erro para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let details = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            AppError::DeductionsExceedGross { total, gross } => {
                Some(json!({ "totalDescontos": total, "valorNota": gross }))
            }
            _ => None,
        };

        let mut body = json!({ "code": self.error_code() });
        if let Some(fields) = details {
            body["fields"] = fields;
        }

        ApiError {
            status,
            error: self.message(&locale.0),
            details: Some(body),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
