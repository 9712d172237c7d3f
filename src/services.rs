// src/services.rs

pub mod direct_payment_service;
pub mod invoice_calculator;
pub mod invoice_service;
pub mod receivables_service;
pub mod settlement_service;
pub mod status_rules;
