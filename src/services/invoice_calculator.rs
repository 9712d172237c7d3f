// src/services/invoice_calculator.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{common::error::AppError, models::invoices::InvoiceStatus};

/// Valor líquido = bruto - INSS - ISS - outros.
pub fn compute_net_value(gross: Decimal, inss: Decimal, iss: Decimal, other: Decimal) -> Decimal {
    gross - inss - iss - other
}

pub fn total_deductions(inss: Decimal, iss: Decimal, other: Decimal) -> Decimal {
    inss + iss + other
}

/// Descontos não podem ser negativos nem somar mais que o bruto.
/// Soma igual ao bruto é aceita (líquido zero).
pub fn validate_deductions(
    gross: Decimal,
    inss: Decimal,
    iss: Decimal,
    other: Decimal,
) -> Result<(), AppError> {
    if [inss, iss, other].iter().any(|d| *d < Decimal::ZERO) {
        return Err(AppError::InvalidDeduction);
    }

    let total = total_deductions(inss, iss, other);
    if total > gross {
        return Err(AppError::DeductionsExceedGross { total, gross });
    }

    Ok(())
}

pub fn derive_invoice_status_on_create(due: NaiveDate, today: NaiveDate) -> InvoiceStatus {
    if due < today {
        InvoiceStatus::Vencido
    } else {
        InvoiceStatus::Pendente
    }
}

/// Toda edição de nota já emitida é tratada como renegociação.
pub fn derive_invoice_status_on_edit() -> InvoiceStatus {
    InvoiceStatus::Renegociado
}

pub fn normalize_invoice_number(raw: &str) -> Result<String, AppError> {
    let numero = raw.trim().to_uppercase();
    if numero.is_empty() {
        return Err(AppError::InvalidInvoiceNumber);
    }
    Ok(numero)
}
