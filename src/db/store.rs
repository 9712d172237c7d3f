// src/db/store.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        direct_payments::{DirectPayment, DirectPaymentFilters},
        invoices::{CreateMeasurementInput, Invoice, InvoiceFilters, Measurement},
        receivables::{PaymentMethod, Receivable, ReceivableFilters, ReceivableStatus, ReceivableView},
        reports::{ReportInvoiceStatus, ReportStatus},
    },
};

/// Fonte de dados do módulo financeiro.
///
/// Cada método é uma chamada independente (auto-commit no Postgres).
/// Nenhuma transação atravessa chamadas: a baixa de um recebível é uma
/// sequência de chamadas, e só a primeira é obrigatória.
#[async_trait]
pub trait FinanceStore: Send + Sync {
    // ===== Pagamentos a receber =====

    async fn insert_receivable(&self, receivable: &Receivable) -> Result<Receivable, AppError>;

    async fn find_receivable(&self, id: Uuid) -> Result<Option<Receivable>, AppError>;

    async fn find_receivable_view(&self, id: Uuid) -> Result<Option<ReceivableView>, AppError>;

    async fn list_receivable_views(
        &self,
        filters: &ReceivableFilters,
    ) -> Result<Vec<ReceivableView>, AppError>;

    async fn list_receivables_by_status(
        &self,
        statuses: &[ReceivableStatus],
    ) -> Result<Vec<Receivable>, AppError>;

    /// Status `pago` + observação (quando houver). `None` se o id não existe.
    async fn mark_receivable_paid(
        &self,
        id: Uuid,
        observacao: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Option<Receivable>, AppError>;

    /// Escrita condicional: só altera se o status atual ainda for `expected`.
    async fn set_receivable_status(
        &self,
        id: Uuid,
        expected: ReceivableStatus,
        status: ReceivableStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    async fn update_receivable_payment_method(
        &self,
        id: Uuid,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Option<Receivable>, AppError>;

    /// Grava os campos editáveis (não o status). `None` se o id não existe.
    async fn update_receivable(&self, receivable: &Receivable) -> Result<Option<Receivable>, AppError>;

    async fn delete_receivable(&self, id: Uuid) -> Result<bool, AppError>;

    // ===== Relatórios =====

    /// Retorna o número de linhas afetadas.
    async fn update_report_status(
        &self,
        report_id: Uuid,
        status: ReportStatus,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    async fn update_report_invoices_status(
        &self,
        report_id: Uuid,
        from: ReportInvoiceStatus,
        to: ReportInvoiceStatus,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    // ===== Notas fiscais de obra =====

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<Invoice, AppError>;

    async fn find_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError>;

    async fn list_invoices(
        &self,
        obra_id: Uuid,
        filters: &InvoiceFilters,
    ) -> Result<Vec<Invoice>, AppError>;

    /// Grava todos os campos editáveis. `None` se o id não existe.
    async fn update_invoice(&self, invoice: &Invoice) -> Result<Option<Invoice>, AppError>;

    async fn delete_invoice(&self, id: Uuid) -> Result<bool, AppError>;

    /// `pendente` com vencimento anterior a `today` vira `vencido`.
    async fn mark_overdue_invoices(
        &self,
        obra_id: Uuid,
        today: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    // ===== Medições =====

    /// O número da medição (max + 1 por obra) é atribuído pela fonte de dados.
    async fn insert_measurement(
        &self,
        obra_id: Uuid,
        input: &CreateMeasurementInput,
    ) -> Result<Measurement, AppError>;

    async fn find_measurement(&self, id: Uuid) -> Result<Option<Measurement>, AppError>;

    /// Grava os campos editáveis. O número da medição não muda.
    async fn update_measurement(&self, measurement: &Measurement) -> Result<Option<Measurement>, AppError>;

    async fn list_measurements(&self, obra_id: Uuid) -> Result<Vec<Measurement>, AppError>;

    async fn list_measurements_by_invoice(
        &self,
        nota_fiscal_id: Uuid,
    ) -> Result<Vec<Measurement>, AppError>;

    async fn count_measurements_for_invoice(&self, nota_fiscal_id: Uuid) -> Result<i64, AppError>;

    async fn delete_measurement(&self, id: Uuid) -> Result<bool, AppError>;

    // ===== Pagamentos diretos =====

    async fn insert_direct_payment(&self, payment: &DirectPayment) -> Result<DirectPayment, AppError>;

    async fn find_direct_payment(&self, id: Uuid) -> Result<Option<DirectPayment>, AppError>;

    async fn update_direct_payment(&self, payment: &DirectPayment) -> Result<Option<DirectPayment>, AppError>;

    async fn list_direct_payments(
        &self,
        obra_id: Uuid,
        filters: &DirectPaymentFilters,
    ) -> Result<Vec<DirectPayment>, AppError>;

    async fn delete_direct_payment(&self, id: Uuid) -> Result<bool, AppError>;
}
