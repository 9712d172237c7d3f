// src/db/fixture_repo.rs

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::FinanceStore,
    models::{
        direct_payments::{DirectPayment, DirectPaymentFilters, DirectPaymentMethod},
        invoices::{CreateMeasurementInput, Invoice, InvoiceFilters, InvoiceStatus, Measurement},
        receivables::{
            CompanyKind, PaymentMethod, Receivable, ReceivableFilters, ReceivableLinks, ReceivableStatus,
            ReceivableView,
        },
        reports::{ReportInvoice, ReportInvoiceStatus, ReportStatus, WorkReport},
    },
};

/// Obras usadas pelos dados de demonstração.
pub const SEED_OBRA_PRINCIPAL: Uuid = Uuid::from_u128(0x0b7a_0001);
pub const SEED_OBRA_SECUNDARIA: Uuid = Uuid::from_u128(0x0b7a_0002);

const CLIENTE_PADRAO: &str = "Cliente não informado";
const EMPRESA_PADRAO: &str = "Empresa não informada";

/// Falhas simuladas, para exercitar os caminhos de erro da baixa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureFault {
    ReceivableWrite,
    ReportSync,
    ReportInvoiceSync,
}

#[derive(Default)]
struct FixtureData {
    clients: HashMap<Uuid, String>,
    companies: HashMap<Uuid, String>,
    reports: HashMap<Uuid, WorkReport>,
    report_invoices: Vec<ReportInvoice>,
    receivables: HashMap<Uuid, Receivable>,
    invoices: HashMap<Uuid, Invoice>,
    measurements: HashMap<Uuid, Measurement>,
    direct_payments: HashMap<Uuid, DirectPayment>,
}

impl FixtureData {
    fn view_of(&self, r: &Receivable) -> ReceivableView {
        let report = r.relatorio_id.and_then(|id| self.reports.get(&id));
        let nota = r.relatorio_id.and_then(|id| {
            self.report_invoices
                .iter()
                .filter(|nf| nf.relatorio_id == id)
                .max_by_key(|nf| nf.created_at)
        });

        let cliente_nome = self
            .clients
            .get(&r.cliente_id)
            .cloned()
            .unwrap_or_else(|| CLIENTE_PADRAO.to_string());
        let empresa_nome = r
            .empresa_id
            .and_then(|id| self.companies.get(&id).cloned())
            .unwrap_or_else(|| EMPRESA_PADRAO.to_string());

        ReceivableView {
            pagamento: r.clone(),
            links: ReceivableLinks {
                cliente_nome: Some(cliente_nome),
                empresa_nome: Some(empresa_nome),
                report_number: report.map(|rep| rep.report_number.clone()),
                relatorio_data: report.map(|rep| rep.date),
                relatorio_valor: report.map(|rep| rep.total_value),
                relatorio_status: report.map(|rep| rep.status),
                nota_fiscal_id: nota.map(|nf| nf.id),
                numero_nota: nota.map(|nf| nf.numero_nota.clone()),
                nf_data_vencimento: nota.map(|nf| nf.data_vencimento),
                nf_valor: nota.map(|nf| nf.valor),
                nf_status: nota.map(|nf| nf.status),
            },
        }
    }
}

/// Fonte de dados em memória (modo `DATA_SOURCE=fixtures` e testes).
///
/// O lock é tomado por chamada e nunca atravessa um `.await`.
#[derive(Default)]
pub struct FixtureFinanceRepository {
    data: RwLock<FixtureData>,
    faults: RwLock<HashSet<FixtureFault>>,
}

impl FixtureFinanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, FixtureData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FixtureData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_fault(&self, fault: FixtureFault) -> Result<(), AppError> {
        let faults = self.faults.read().unwrap_or_else(PoisonError::into_inner);
        if faults.contains(&fault) {
            return Err(AppError::StoreUnavailable(format!("falha simulada: {fault:?}")));
        }
        Ok(())
    }

    pub fn inject_fault(&self, fault: FixtureFault) {
        self.faults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fault);
    }

    pub fn clear_faults(&self) {
        self.faults.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    // ===== Cadastros de apoio =====

    pub fn add_client(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.write().clients.insert(id, name.to_string());
        id
    }

    pub fn add_company(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.write().companies.insert(id, name.to_string());
        id
    }

    pub fn add_report(
        &self,
        report_number: &str,
        client_id: Uuid,
        date: NaiveDate,
        total_value: Decimal,
        status: ReportStatus,
    ) -> Uuid {
        let report = WorkReport {
            id: Uuid::new_v4(),
            report_number: report_number.to_string(),
            date,
            client_id,
            total_value,
            status,
            updated_at: Utc::now(),
        };
        let id = report.id;
        self.write().reports.insert(id, report);
        id
    }

    pub fn add_report_invoice(
        &self,
        relatorio_id: Uuid,
        numero_nota: &str,
        data_vencimento: NaiveDate,
        valor: Decimal,
        status: ReportInvoiceStatus,
    ) -> Uuid {
        let now = Utc::now();
        let nota = ReportInvoice {
            id: Uuid::new_v4(),
            relatorio_id,
            numero_nota: numero_nota.to_string(),
            data_emissao: now.date_naive(),
            data_vencimento,
            valor,
            status,
            created_at: now,
            updated_at: now,
        };
        let id = nota.id;
        self.write().report_invoices.push(nota);
        id
    }

    pub fn report(&self, id: Uuid) -> Option<WorkReport> {
        self.read().reports.get(&id).cloned()
    }

    pub fn report_invoices(&self, relatorio_id: Uuid) -> Vec<ReportInvoice> {
        self.read()
            .report_invoices
            .iter()
            .filter(|nf| nf.relatorio_id == relatorio_id)
            .cloned()
            .collect()
    }

    /// Base de demonstração, com vencimentos relativos a `today`.
    pub fn seeded(today: NaiveDate) -> Self {
        let repo = Self::new();
        let now = Utc::now();

        let alfa = repo.add_client("Construtora Alfa");
        let prefeitura = repo.add_client("Prefeitura de Itapecerica");
        let worldpav = repo.add_company("WorldPav Pavimentação");

        let rpt_1 = repo.add_report("RPT-2025-0001", alfa, today - Days::new(20), Decimal::new(1_850_000, 2), ReportStatus::NotaEmitida);
        let rpt_2 = repo.add_report("RPT-2025-0002", prefeitura, today - Days::new(12), Decimal::new(920_000, 2), ReportStatus::AguardandoPagamento);
        let rpt_3 = repo.add_report("RPT-2025-0003", alfa, today - Days::new(40), Decimal::new(430_000, 2), ReportStatus::AguardandoPagamento);

        repo.add_report_invoice(rpt_1, "NF-1001", today + Days::new(2), Decimal::new(1_850_000, 2), ReportInvoiceStatus::Faturada);
        repo.add_report_invoice(rpt_3, "NF-0987", today - Days::new(5), Decimal::new(430_000, 2), ReportInvoiceStatus::Faturada);

        let receivable = |relatorio_id, cliente_id, valor: Decimal, forma, prazo_data, status| Receivable {
            id: Uuid::new_v4(),
            relatorio_id: Some(relatorio_id),
            cliente_id,
            empresa_id: Some(worldpav),
            empresa_tipo: Some(CompanyKind::Interna),
            valor_total: valor,
            forma_pagamento: forma,
            prazo_data: Some(prazo_data),
            prazo_dias: None,
            status,
            observacoes: None,
            created_at: now,
            updated_at: now,
        };

        {
            let mut data = repo.write();
            for r in [
                receivable(rpt_1, alfa, Decimal::new(1_850_000, 2), PaymentMethod::Boleto, today + Days::new(2), ReceivableStatus::Aguardando),
                receivable(rpt_2, prefeitura, Decimal::new(920_000, 2), PaymentMethod::Pix, today + Days::new(25), ReceivableStatus::Aguardando),
                receivable(rpt_3, alfa, Decimal::new(430_000, 2), PaymentMethod::Boleto, today - Days::new(5), ReceivableStatus::ProximoVencimento),
            ] {
                data.receivables.insert(r.id, r);
            }

            let direct = |obra_id, descricao: &str, valor: i64, data_pagamento, forma| DirectPayment {
                id: Uuid::new_v4(),
                obra_id,
                descricao: descricao.to_string(),
                valor: Decimal::new(valor, 0),
                data_pagamento,
                forma_pagamento: forma,
                comprovante_url: None,
                observacoes: None,
                created_at: now,
                updated_at: now,
            };
            for p in [
                direct(SEED_OBRA_PRINCIPAL, "PIX - Avanço de Pagamento", 15_000, today - Days::new(10), DirectPaymentMethod::Pix),
                direct(SEED_OBRA_PRINCIPAL, "Transferência - Pagamento Final", 25_000, today - Days::new(5), DirectPaymentMethod::Transferencia),
                direct(SEED_OBRA_SECUNDARIA, "PIX - Pagamento Mensal", 12_000, today - Days::new(1), DirectPaymentMethod::Pix),
            ] {
                data.direct_payments.insert(p.id, p);
            }

            let nf = Invoice {
                id: Uuid::new_v4(),
                obra_id: SEED_OBRA_PRINCIPAL,
                numero_nota: "NF-2025-001".to_string(),
                valor_nota: Decimal::new(10_000, 0),
                desconto_inss: Decimal::new(1_100, 0),
                desconto_iss: Decimal::new(500, 0),
                outro_desconto: Decimal::ZERO,
                valor_liquido: Decimal::new(8_400, 0),
                vencimento: today + Days::new(15),
                status: InvoiceStatus::Pendente,
                data_pagamento: None,
                arquivo_nota_url: None,
                observacoes: None,
                created_at: now,
                updated_at: now,
            };
            data.invoices.insert(nf.id, nf);
        }

        repo
    }
}

#[async_trait]
impl FinanceStore for FixtureFinanceRepository {
    // ===== Pagamentos a receber =====

    async fn insert_receivable(&self, receivable: &Receivable) -> Result<Receivable, AppError> {
        self.check_fault(FixtureFault::ReceivableWrite)?;
        self.write().receivables.insert(receivable.id, receivable.clone());
        Ok(receivable.clone())
    }

    async fn find_receivable(&self, id: Uuid) -> Result<Option<Receivable>, AppError> {
        Ok(self.read().receivables.get(&id).cloned())
    }

    async fn find_receivable_view(&self, id: Uuid) -> Result<Option<ReceivableView>, AppError> {
        let data = self.read();
        Ok(data.receivables.get(&id).map(|r| data.view_of(r)))
    }

    async fn list_receivable_views(
        &self,
        filters: &ReceivableFilters,
    ) -> Result<Vec<ReceivableView>, AppError> {
        let data = self.read();
        let mut rows: Vec<&Receivable> = data.receivables.values().filter(|r| filters.matches(r)).collect();

        // Mesma ordem da consulta SQL: vencimento (nulos por último), depois mais recentes
        rows.sort_by(|a, b| match (a.prazo_data, b.prazo_data) {
            (Some(x), Some(y)) => x.cmp(&y).then(b.created_at.cmp(&a.created_at)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.created_at.cmp(&a.created_at),
        });

        Ok(rows.into_iter().map(|r| data.view_of(r)).collect())
    }

    async fn list_receivables_by_status(
        &self,
        statuses: &[ReceivableStatus],
    ) -> Result<Vec<Receivable>, AppError> {
        let mut rows: Vec<Receivable> = self
            .read()
            .receivables
            .values()
            .filter(|r| statuses.contains(&r.status))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn mark_receivable_paid(
        &self,
        id: Uuid,
        observacao: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Option<Receivable>, AppError> {
        self.check_fault(FixtureFault::ReceivableWrite)?;

        let mut data = self.write();
        let Some(r) = data.receivables.get_mut(&id) else {
            return Ok(None);
        };
        r.status = ReceivableStatus::Pago;
        if let Some(obs) = observacao {
            r.observacoes = Some(obs.to_string());
        }
        r.updated_at = at;
        Ok(Some(r.clone()))
    }

    async fn set_receivable_status(
        &self,
        id: Uuid,
        expected: ReceivableStatus,
        status: ReceivableStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        self.check_fault(FixtureFault::ReceivableWrite)?;

        let mut data = self.write();
        match data.receivables.get_mut(&id) {
            Some(r) if r.status == expected => {
                r.status = status;
                r.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_receivable_payment_method(
        &self,
        id: Uuid,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Option<Receivable>, AppError> {
        self.check_fault(FixtureFault::ReceivableWrite)?;

        let mut data = self.write();
        Ok(data.receivables.get_mut(&id).map(|r| {
            r.forma_pagamento = method;
            r.updated_at = at;
            r.clone()
        }))
    }

    async fn update_receivable(&self, receivable: &Receivable) -> Result<Option<Receivable>, AppError> {
        self.check_fault(FixtureFault::ReceivableWrite)?;

        let mut data = self.write();
        Ok(data.receivables.get_mut(&receivable.id).map(|stored| {
            // Status só muda pela varredura ou pela baixa
            *stored = Receivable {
                status: stored.status,
                created_at: stored.created_at,
                ..receivable.clone()
            };
            stored.clone()
        }))
    }

    async fn delete_receivable(&self, id: Uuid) -> Result<bool, AppError> {
        self.check_fault(FixtureFault::ReceivableWrite)?;
        Ok(self.write().receivables.remove(&id).is_some())
    }

    // ===== Relatórios =====

    async fn update_report_status(
        &self,
        report_id: Uuid,
        status: ReportStatus,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        self.check_fault(FixtureFault::ReportSync)?;

        let mut data = self.write();
        Ok(match data.reports.get_mut(&report_id) {
            Some(report) => {
                report.status = status;
                report.updated_at = at;
                1
            }
            None => 0,
        })
    }

    async fn update_report_invoices_status(
        &self,
        report_id: Uuid,
        from: ReportInvoiceStatus,
        to: ReportInvoiceStatus,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        self.check_fault(FixtureFault::ReportInvoiceSync)?;

        let mut data = self.write();
        let mut affected = 0;
        for nf in data
            .report_invoices
            .iter_mut()
            .filter(|nf| nf.relatorio_id == report_id && nf.status == from)
        {
            nf.status = to;
            nf.updated_at = at;
            affected += 1;
        }
        Ok(affected)
    }

    // ===== Notas fiscais de obra =====

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<Invoice, AppError> {
        self.write().invoices.insert(invoice.id, invoice.clone());
        Ok(invoice.clone())
    }

    async fn find_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        Ok(self.read().invoices.get(&id).cloned())
    }

    async fn list_invoices(
        &self,
        obra_id: Uuid,
        filters: &InvoiceFilters,
    ) -> Result<Vec<Invoice>, AppError> {
        let mut rows: Vec<Invoice> = self
            .read()
            .invoices
            .values()
            .filter(|nf| nf.obra_id == obra_id && filters.matches(nf))
            .cloned()
            .collect();
        rows.sort_by_key(|nf| nf.vencimento);
        Ok(rows)
    }

    async fn update_invoice(&self, invoice: &Invoice) -> Result<Option<Invoice>, AppError> {
        let mut data = self.write();
        Ok(data.invoices.get_mut(&invoice.id).map(|stored| {
            *stored = invoice.clone();
            stored.clone()
        }))
    }

    async fn delete_invoice(&self, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.write();
        // Equivalente ao ON DELETE RESTRICT das medições
        if data.measurements.values().any(|m| m.nota_fiscal_id == Some(id)) {
            return Err(AppError::InvoiceHasMeasurements(id));
        }
        Ok(data.invoices.remove(&id).is_some())
    }

    async fn mark_overdue_invoices(
        &self,
        obra_id: Uuid,
        today: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let mut data = self.write();
        let mut affected = 0;
        for nf in data.invoices.values_mut().filter(|nf| {
            nf.obra_id == obra_id && nf.status == InvoiceStatus::Pendente && nf.vencimento < today
        }) {
            nf.status = InvoiceStatus::Vencido;
            nf.updated_at = at;
            affected += 1;
        }
        Ok(affected)
    }

    // ===== Medições =====

    async fn insert_measurement(
        &self,
        obra_id: Uuid,
        input: &CreateMeasurementInput,
    ) -> Result<Measurement, AppError> {
        let mut data = self.write();
        let numero_medicao = data
            .measurements
            .values()
            .filter(|m| m.obra_id == obra_id)
            .map(|m| m.numero_medicao)
            .max()
            .unwrap_or(0)
            + 1;

        let now = Utc::now();
        let medicao = Measurement {
            id: Uuid::new_v4(),
            obra_id,
            nota_fiscal_id: input.nota_fiscal_id,
            descricao: input.descricao.clone(),
            arquivo_medicao_url: input.arquivo_medicao_url.clone(),
            data_medicao: input.data_medicao,
            numero_medicao,
            created_at: now,
            updated_at: now,
        };
        data.measurements.insert(medicao.id, medicao.clone());
        Ok(medicao)
    }

    async fn find_measurement(&self, id: Uuid) -> Result<Option<Measurement>, AppError> {
        Ok(self.read().measurements.get(&id).cloned())
    }

    async fn update_measurement(&self, measurement: &Measurement) -> Result<Option<Measurement>, AppError> {
        let mut data = self.write();
        Ok(data.measurements.get_mut(&measurement.id).map(|stored| {
            *stored = Measurement {
                numero_medicao: stored.numero_medicao,
                created_at: stored.created_at,
                ..measurement.clone()
            };
            stored.clone()
        }))
    }

    async fn list_measurements(&self, obra_id: Uuid) -> Result<Vec<Measurement>, AppError> {
        let mut rows: Vec<Measurement> = self
            .read()
            .measurements
            .values()
            .filter(|m| m.obra_id == obra_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.numero_medicao);
        Ok(rows)
    }

    async fn list_measurements_by_invoice(
        &self,
        nota_fiscal_id: Uuid,
    ) -> Result<Vec<Measurement>, AppError> {
        let mut rows: Vec<Measurement> = self
            .read()
            .measurements
            .values()
            .filter(|m| m.nota_fiscal_id == Some(nota_fiscal_id))
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.numero_medicao);
        Ok(rows)
    }

    async fn count_measurements_for_invoice(&self, nota_fiscal_id: Uuid) -> Result<i64, AppError> {
        let count = self
            .read()
            .measurements
            .values()
            .filter(|m| m.nota_fiscal_id == Some(nota_fiscal_id))
            .count();
        Ok(count as i64)
    }

    async fn delete_measurement(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.write().measurements.remove(&id).is_some())
    }

    // ===== Pagamentos diretos =====

    async fn insert_direct_payment(&self, payment: &DirectPayment) -> Result<DirectPayment, AppError> {
        self.write().direct_payments.insert(payment.id, payment.clone());
        Ok(payment.clone())
    }

    async fn find_direct_payment(&self, id: Uuid) -> Result<Option<DirectPayment>, AppError> {
        Ok(self.read().direct_payments.get(&id).cloned())
    }

    async fn update_direct_payment(&self, payment: &DirectPayment) -> Result<Option<DirectPayment>, AppError> {
        let mut data = self.write();
        Ok(data.direct_payments.get_mut(&payment.id).map(|stored| {
            *stored = DirectPayment {
                obra_id: stored.obra_id,
                created_at: stored.created_at,
                ..payment.clone()
            };
            stored.clone()
        }))
    }

    async fn list_direct_payments(
        &self,
        obra_id: Uuid,
        filters: &DirectPaymentFilters,
    ) -> Result<Vec<DirectPayment>, AppError> {
        let mut rows: Vec<DirectPayment> = self
            .read()
            .direct_payments
            .values()
            .filter(|p| p.obra_id == obra_id && filters.matches(p))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.data_pagamento.cmp(&a.data_pagamento));
        Ok(rows)
    }

    async fn delete_direct_payment(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.write().direct_payments.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    #[tokio::test]
    async fn view_falls_back_to_default_names() {
        let repo = FixtureFinanceRepository::new();
        let now = Utc::now();
        let r = Receivable {
            id: Uuid::new_v4(),
            relatorio_id: None,
            cliente_id: Uuid::new_v4(),
            empresa_id: None,
            empresa_tipo: None,
            valor_total: Decimal::ONE_HUNDRED,
            forma_pagamento: PaymentMethod::SemForma,
            prazo_data: Some(today()),
            prazo_dias: None,
            status: ReceivableStatus::Aguardando,
            observacoes: None,
            created_at: now,
            updated_at: now,
        };
        repo.insert_receivable(&r).await.unwrap();

        let view = repo.find_receivable_view(r.id).await.unwrap().unwrap();
        assert_eq!(view.links.cliente_nome.as_deref(), Some(CLIENTE_PADRAO));
        assert_eq!(view.links.empresa_nome.as_deref(), Some(EMPRESA_PADRAO));
        assert!(view.links.nota_fiscal_id.is_none());
    }

    #[tokio::test]
    async fn measurement_numbers_are_sequential_per_project() {
        let repo = FixtureFinanceRepository::new();
        let input = CreateMeasurementInput {
            nota_fiscal_id: None,
            descricao: "Medição".into(),
            arquivo_medicao_url: "https://arquivos/medicao.pdf".into(),
            data_medicao: today(),
        };

        let a = repo.insert_measurement(SEED_OBRA_PRINCIPAL, &input).await.unwrap();
        let b = repo.insert_measurement(SEED_OBRA_PRINCIPAL, &input).await.unwrap();
        let other = repo.insert_measurement(SEED_OBRA_SECUNDARIA, &input).await.unwrap();

        assert_eq!((a.numero_medicao, b.numero_medicao), (1, 2));
        assert_eq!(other.numero_medicao, 1);
    }

    #[tokio::test]
    async fn injected_fault_fails_only_its_step() {
        let repo = FixtureFinanceRepository::seeded(today());
        repo.inject_fault(FixtureFault::ReportSync);

        let err = repo
            .update_report_status(Uuid::new_v4(), ReportStatus::Pago, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PERSISTENCE_FAILURE");

        let affected = repo
            .update_report_invoices_status(Uuid::new_v4(), ReportInvoiceStatus::Faturada, ReportInvoiceStatus::Paga, Utc::now())
            .await
            .unwrap();
        assert_eq!(affected, 0);

        repo.clear_faults();
        assert!(repo.update_report_status(Uuid::new_v4(), ReportStatus::Pago, Utc::now()).await.is_ok());
    }

    #[tokio::test]
    async fn seeded_direct_payments_belong_to_their_projects() {
        let repo = FixtureFinanceRepository::seeded(today());
        let total = |rows: Vec<DirectPayment>| rows.iter().map(|p| p.valor).sum::<Decimal>();

        let principal = repo.list_direct_payments(SEED_OBRA_PRINCIPAL, &DirectPaymentFilters::default()).await.unwrap();
        let secundaria = repo.list_direct_payments(SEED_OBRA_SECUNDARIA, &DirectPaymentFilters::default()).await.unwrap();
        assert_eq!(total(principal), Decimal::new(40_000, 0));
        assert_eq!(total(secundaria), Decimal::new(12_000, 0));
    }

    #[tokio::test]
    async fn update_keeps_measurement_number_and_status() {
        let repo = FixtureFinanceRepository::new();
        let input = CreateMeasurementInput {
            nota_fiscal_id: None,
            descricao: "Medição".into(),
            arquivo_medicao_url: "https://arquivos/medicao.pdf".into(),
            data_medicao: today(),
        };
        let mut medicao = repo.insert_measurement(SEED_OBRA_PRINCIPAL, &input).await.unwrap();
        medicao.numero_medicao = 99;
        medicao.descricao = "Medição revisada".into();

        let stored = repo.update_measurement(&medicao).await.unwrap().unwrap();
        assert_eq!(stored.numero_medicao, 1);
        assert_eq!(stored.descricao, "Medição revisada");
        assert!(repo.find_measurement(Uuid::new_v4()).await.unwrap().is_none());
    }
}
