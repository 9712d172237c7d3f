// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "WorldPav Financeiro", description = "Recebíveis, notas fiscais de obra e baixa de pagamentos"),
    paths(
        // --- Receivables ---
        handlers::receivables::list_receivables,
        handlers::receivables::create_receivable,
        handlers::receivables::get_receivable,
        handlers::receivables::update_receivable,
        handlers::receivables::delete_receivable,
        handlers::receivables::receivable_stats,
        handlers::receivables::sweep_receivables,
        handlers::receivables::mark_receivable_as_paid,
        handlers::receivables::update_payment_method,

        // --- Invoices ---
        handlers::invoices::list_invoices,
        handlers::invoices::create_invoice,
        handlers::invoices::get_invoice,
        handlers::invoices::update_invoice,
        handlers::invoices::mark_invoice_paid,
        handlers::invoices::delete_invoice,
        handlers::invoices::project_financial_summary,

        // --- Measurements ---
        handlers::invoices::list_measurements,
        handlers::invoices::create_measurement,
        handlers::invoices::list_measurements_by_invoice,
        handlers::invoices::get_measurement,
        handlers::invoices::update_measurement,
        handlers::invoices::delete_measurement,

        // --- Direct Payments ---
        handlers::direct_payments::list_direct_payments,
        handlers::direct_payments::create_direct_payment,
        handlers::direct_payments::update_direct_payment,
        handlers::direct_payments::delete_direct_payment,

        // --- Schedule ---
        handlers::schedule::remaining_time,
    ),
    components(
        schemas(
            // --- Receivables ---
            models::receivables::ReceivableStatus,
            models::receivables::PaymentMethod,
            models::receivables::CompanyKind,
            models::receivables::Receivable,
            models::receivables::ReceivableLinks,
            models::receivables::ReceivableDetail,
            models::receivables::ReceivableStats,
            models::receivables::CreateReceivableInput,
            models::receivables::UpdateReceivableInput,
            models::receivables::MarkAsPaidPayload,
            models::receivables::UpdatePaymentMethodPayload,
            models::receivables::SyncStep,
            models::receivables::SyncWarning,
            models::receivables::SettlementOutcome,
            handlers::receivables::SweepResponse,

            // --- Reports ---
            models::reports::ReportStatus,
            models::reports::ReportInvoiceStatus,

            // --- Invoices ---
            models::invoices::InvoiceStatus,
            models::invoices::Invoice,
            models::invoices::CreateInvoiceInput,
            models::invoices::UpdateInvoiceInput,
            models::invoices::MarkInvoicePaidPayload,
            models::invoices::Measurement,
            models::invoices::CreateMeasurementInput,
            models::invoices::UpdateMeasurementInput,
            models::invoices::InvoiceTotals,
            models::invoices::DirectPaymentTotals,
            models::invoices::ProjectFinancialSummary,

            // --- Direct Payments ---
            models::direct_payments::DirectPaymentMethod,
            models::direct_payments::DirectPayment,
            models::direct_payments::CreateDirectPaymentInput,
            models::direct_payments::UpdateDirectPaymentInput,

            // --- Schedule ---
            handlers::schedule::RemainingTimeResponse,
        )
    ),
    tags(
        (name = "Receivables", description = "Pagamentos a receber e baixa"),
        (name = "Invoices", description = "Notas fiscais de obra e faturamento"),
        (name = "Measurements", description = "Medições de obra"),
        (name = "Direct Payments", description = "Pagamentos recebidos sem nota fiscal"),
        (name = "Schedule", description = "Contagem regressiva da programação")
    )
)]
pub struct ApiDoc;
