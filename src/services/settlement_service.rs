// src/services/settlement_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceStore,
    models::receivables::{PaymentMethod, ReceivableDetail, SettlementOutcome, SyncStep, SyncWarning},
    models::reports::{ReportInvoiceStatus, ReportStatus},
    services::receivables_service::build_detail,
};

/// Baixa de recebíveis.
///
/// A baixa é uma saga sem transação: marcar o pagamento como `pago` é o único
/// passo obrigatório. Atualizar o relatório e as notas fiscais dele é feito em
/// seguida, em chamadas separadas; falhas nesses passos viram avisos no
/// resultado e ficam no log, sem desfazer o pagamento.
#[derive(Clone)]
pub struct SettlementService {
    store: Arc<dyn FinanceStore>,
}

impl SettlementService {
    pub fn new(store: Arc<dyn FinanceStore>) -> Self {
        Self { store }
    }

    pub async fn mark_receivable_as_paid(
        &self,
        id: Uuid,
        observacao: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SettlementOutcome, AppError> {
        // Texto vazio conta como "sem observação"
        let observacao = observacao.filter(|o| !o.trim().is_empty());

        // 1. Pagamento (obrigatório)
        let pagamento = self
            .store
            .mark_receivable_paid(id, observacao.as_deref(), now)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento".into()))?;

        tracing::info!("Pagamento {} marcado como pago", id);

        let mut avisos = Vec::new();

        if let Some(relatorio_id) = pagamento.relatorio_id {
            // 2. Relatório -> PAGO
            match self.store.update_report_status(relatorio_id, ReportStatus::Pago, now).await {
                Ok(0) => avisos.push(self.warn(
                    SyncStep::RelatorioStatus,
                    relatorio_id,
                    "relatório não encontrado".to_string(),
                )),
                Ok(_) => {}
                Err(e) => avisos.push(self.warn(SyncStep::RelatorioStatus, relatorio_id, e.to_string())),
            }

            // 3. Notas fiscais do relatório: Faturada -> Paga (independe do passo 2)
            match self
                .store
                .update_report_invoices_status(
                    relatorio_id,
                    ReportInvoiceStatus::Faturada,
                    ReportInvoiceStatus::Paga,
                    now,
                )
                .await
            {
                Ok(n) => tracing::debug!("{} nota(s) do relatório {} marcadas como pagas", n, relatorio_id),
                Err(e) => avisos.push(self.warn(SyncStep::NotasFiscaisRelatorio, relatorio_id, e.to_string())),
            }
        }

        // 4. Visão integrada atualizada
        let view = self
            .store
            .find_receivable_view(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento".into()))?;

        Ok(SettlementOutcome {
            pagamento: build_detail(view, now.date_naive()),
            avisos,
        })
    }

    pub async fn update_payment_method(
        &self,
        id: Uuid,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Result<ReceivableDetail, AppError> {
        self.store
            .update_receivable_payment_method(id, method, now)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento".into()))?;

        let view = self
            .store
            .find_receivable_view(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento".into()))?;

        Ok(build_detail(view, now.date_naive()))
    }

    fn warn(&self, step: SyncStep, relatorio_id: Uuid, message: String) -> SyncWarning {
        tracing::warn!(
            "Baixa parcial: passo {:?} falhou para o relatório {}: {}",
            step,
            relatorio_id,
            message
        );
        SyncWarning {
            step,
            relatorio_id,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FixtureFault, FixtureFinanceRepository};
    use crate::models::receivables::{CompanyKind, Receivable, ReceivableStatus};
    use chrono::{Days, NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    struct Fixture {
        repo: Arc<FixtureFinanceRepository>,
        service: SettlementService,
        receivable_id: Uuid,
        report_id: Uuid,
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap()
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(FixtureFinanceRepository::new());
        let today = now().date_naive();
        let client = repo.add_client("Construtora Alfa");
        let report_id = repo.add_report("RPT-1", client, today, dec!(5000), ReportStatus::NotaEmitida);
        repo.add_report_invoice(report_id, "NF-1", today + Days::new(5), dec!(5000), ReportInvoiceStatus::Faturada);
        repo.add_report_invoice(report_id, "NF-0", today, dec!(100), ReportInvoiceStatus::Cancelada);

        let receivable = Receivable {
            id: Uuid::new_v4(),
            relatorio_id: Some(report_id),
            cliente_id: client,
            empresa_id: None,
            empresa_tipo: Some(CompanyKind::Terceira),
            valor_total: dec!(5000),
            forma_pagamento: PaymentMethod::Boleto,
            prazo_data: Some(today - Days::new(3)),
            prazo_dias: None,
            status: ReceivableStatus::Vencido,
            observacoes: Some("primeira cobrança".into()),
            created_at: now(),
            updated_at: now(),
        };
        repo.insert_receivable(&receivable).await.unwrap();

        Fixture {
            service: SettlementService::new(repo.clone()),
            repo,
            receivable_id: receivable.id,
            report_id,
        }
    }

    #[tokio::test]
    async fn settles_receivable_report_and_invoices() {
        let f = fixture().await;

        let outcome = f
            .service
            .mark_receivable_as_paid(f.receivable_id, Some("Pago via boleto".into()), now())
            .await
            .unwrap();

        assert!(outcome.avisos.is_empty());
        assert_eq!(outcome.pagamento.pagamento.status, ReceivableStatus::Pago);
        assert_eq!(outcome.pagamento.pagamento.observacoes.as_deref(), Some("Pago via boleto"));
        assert!(outcome.pagamento.relatorio_pago);
        assert_eq!(outcome.pagamento.status_unificado, ReceivableStatus::Pago);

        assert_eq!(f.repo.report(f.report_id).unwrap().status, ReportStatus::Pago);
        let statuses: Vec<_> = f.repo.report_invoices(f.report_id).iter().map(|nf| nf.status).collect();
        assert!(statuses.contains(&ReportInvoiceStatus::Paga));
        // Cancelada não é tocada
        assert!(statuses.contains(&ReportInvoiceStatus::Cancelada));
        assert!(!statuses.contains(&ReportInvoiceStatus::Faturada));
    }

    #[tokio::test]
    async fn empty_note_keeps_existing_one() {
        let f = fixture().await;
        let outcome = f
            .service
            .mark_receivable_as_paid(f.receivable_id, Some(String::new()), now())
            .await
            .unwrap();
        assert_eq!(outcome.pagamento.pagamento.observacoes.as_deref(), Some("primeira cobrança"));
    }

    #[tokio::test]
    async fn settling_twice_stays_paid() {
        let f = fixture().await;
        let first = f.service.mark_receivable_as_paid(f.receivable_id, None, now()).await.unwrap();
        let later = now() + chrono::Duration::hours(1);
        let second = f.service.mark_receivable_as_paid(f.receivable_id, None, later).await.unwrap();

        assert_eq!(first.pagamento.pagamento.status, ReceivableStatus::Pago);
        assert_eq!(second.pagamento.pagamento.status, ReceivableStatus::Pago);
        assert_eq!(second.pagamento.pagamento.updated_at, later);
    }

    #[tokio::test]
    async fn secondary_failures_become_warnings() {
        let f = fixture().await;
        f.repo.inject_fault(FixtureFault::ReportSync);
        f.repo.inject_fault(FixtureFault::ReportInvoiceSync);

        let outcome = f.service.mark_receivable_as_paid(f.receivable_id, None, now()).await.unwrap();

        assert_eq!(outcome.pagamento.pagamento.status, ReceivableStatus::Pago);
        let steps: Vec<_> = outcome.avisos.iter().map(|w| w.step).collect();
        assert_eq!(steps, vec![SyncStep::RelatorioStatus, SyncStep::NotasFiscaisRelatorio]);
        assert!(outcome.avisos.iter().all(|w| w.relatorio_id == f.report_id));

        // Nada foi desfeito nem propagado
        assert_eq!(f.repo.report(f.report_id).unwrap().status, ReportStatus::NotaEmitida);
    }

    #[tokio::test]
    async fn invoice_sync_runs_even_when_report_sync_fails() {
        let f = fixture().await;
        f.repo.inject_fault(FixtureFault::ReportSync);

        let outcome = f.service.mark_receivable_as_paid(f.receivable_id, None, now()).await.unwrap();

        assert_eq!(outcome.avisos.len(), 1);
        assert!(f
            .repo
            .report_invoices(f.report_id)
            .iter()
            .any(|nf| nf.status == ReportInvoiceStatus::Paga));
    }

    #[tokio::test]
    async fn primary_failure_propagates() {
        let f = fixture().await;
        f.repo.inject_fault(FixtureFault::ReceivableWrite);

        let err = f.service.mark_receivable_as_paid(f.receivable_id, None, now()).await.unwrap_err();
        assert_eq!(err.error_code(), "PERSISTENCE_FAILURE");
        assert_eq!(f.repo.report(f.report_id).unwrap().status, ReportStatus::NotaEmitida);
    }

    #[tokio::test]
    async fn unknown_receivable_is_not_found() {
        let f = fixture().await;
        let err = f.service.mark_receivable_as_paid(Uuid::new_v4(), None, now()).await.unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
    }

    #[tokio::test]
    async fn missing_report_is_a_warning() {
        let repo = Arc::new(FixtureFinanceRepository::new());
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let receivable = Receivable {
            id: Uuid::new_v4(),
            relatorio_id: Some(Uuid::new_v4()),
            cliente_id: Uuid::new_v4(),
            empresa_id: None,
            empresa_tipo: None,
            valor_total: dec!(100),
            forma_pagamento: PaymentMethod::Pix,
            prazo_data: Some(today),
            prazo_dias: None,
            status: ReceivableStatus::ProximoVencimento,
            observacoes: None,
            created_at: now(),
            updated_at: now(),
        };
        repo.insert_receivable(&receivable).await.unwrap();

        let service = SettlementService::new(repo);
        let outcome = service.mark_receivable_as_paid(receivable.id, None, now()).await.unwrap();
        assert_eq!(outcome.avisos.len(), 1);
        assert_eq!(outcome.avisos[0].step, SyncStep::RelatorioStatus);
    }

    #[tokio::test]
    async fn payment_method_update_only_touches_the_method() {
        let f = fixture().await;
        let detail = f
            .service
            .update_payment_method(f.receivable_id, PaymentMethod::Pix, now())
            .await
            .unwrap();
        assert_eq!(detail.pagamento.forma_pagamento, PaymentMethod::Pix);
        assert_eq!(detail.pagamento.status, ReceivableStatus::Vencido);
    }
}
