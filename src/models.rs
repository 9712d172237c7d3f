// src/models.rs

pub mod direct_payments;
pub mod invoices;
pub mod receivables;
pub mod reports;
