// src/services/invoice_service.rs

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::FinanceStore,
    models::invoices::{
        CreateInvoiceInput, CreateMeasurementInput, DirectPaymentTotals, Invoice, InvoiceFilters,
        InvoiceStatus, InvoiceTotals, Measurement, ProjectFinancialSummary, UpdateInvoiceInput,
        UpdateMeasurementInput,
    },
    models::direct_payments::DirectPaymentFilters,
    services::invoice_calculator::{
        compute_net_value, derive_invoice_status_on_create, derive_invoice_status_on_edit,
        normalize_invoice_number, validate_deductions,
    },
};

#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn FinanceStore>,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn FinanceStore>) -> Self {
        Self { store }
    }

    async fn find_or_404(&self, id: Uuid) -> Result<Invoice, AppError> {
        self.store
            .find_invoice(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Nota fiscal".into()))
    }

    /// Nota de outra obra conta como inexistente para esta obra.
    async fn ensure_invoice_in_project(&self, nota_fiscal_id: Uuid, obra_id: Uuid) -> Result<(), AppError> {
        let nf = self.find_or_404(nota_fiscal_id).await?;
        if nf.obra_id != obra_id {
            return Err(AppError::ResourceNotFound("Nota fiscal".into()));
        }
        Ok(())
    }

    // =========================================================================
    //  NOTAS FISCAIS
    // =========================================================================

    pub async fn list_invoices(
        &self,
        obra_id: Uuid,
        filters: &InvoiceFilters,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invoice>, AppError> {
        self.sweep_overdue_invoices(obra_id, now).await?;
        self.store.list_invoices(obra_id, filters).await
    }

    pub async fn get_invoice(&self, id: Uuid) -> Result<Invoice, AppError> {
        self.find_or_404(id).await
    }

    pub async fn create_invoice(
        &self,
        obra_id: Uuid,
        input: CreateInvoiceInput,
        now: DateTime<Utc>,
    ) -> Result<Invoice, AppError> {
        input.validate()?;

        let numero_nota = normalize_invoice_number(&input.numero_nota)?;
        if input.valor_nota < Decimal::ZERO {
            return Err(AppError::InvalidAmount("valorNota".into()));
        }
        validate_deductions(input.valor_nota, input.desconto_inss, input.desconto_iss, input.outro_desconto)?;

        let invoice = Invoice {
            id: Uuid::new_v4(),
            obra_id,
            numero_nota,
            valor_nota: input.valor_nota,
            desconto_inss: input.desconto_inss,
            desconto_iss: input.desconto_iss,
            outro_desconto: input.outro_desconto,
            valor_liquido: compute_net_value(
                input.valor_nota,
                input.desconto_inss,
                input.desconto_iss,
                input.outro_desconto,
            ),
            vencimento: input.vencimento,
            status: derive_invoice_status_on_create(input.vencimento, now.date_naive()),
            data_pagamento: None,
            arquivo_nota_url: input.arquivo_nota_url,
            observacoes: input.observacoes,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert_invoice(&invoice).await?;
        tracing::info!("Nota fiscal {} criada na obra {}", created.numero_nota, obra_id);
        Ok(created)
    }

    /// Edição parcial. Recalcula o líquido e marca a nota como renegociada.
    pub async fn update_invoice(
        &self,
        id: Uuid,
        input: UpdateInvoiceInput,
        now: DateTime<Utc>,
    ) -> Result<Invoice, AppError> {
        input.validate()?;

        let mut nf = self.find_or_404(id).await?;

        if let Some(numero) = input.numero_nota.as_deref() {
            nf.numero_nota = normalize_invoice_number(numero)?;
        }
        if let Some(valor) = input.valor_nota {
            if valor < Decimal::ZERO {
                return Err(AppError::InvalidAmount("valorNota".into()));
            }
            nf.valor_nota = valor;
        }
        nf.vencimento = input.vencimento.unwrap_or(nf.vencimento);
        nf.desconto_inss = input.desconto_inss.unwrap_or(nf.desconto_inss);
        nf.desconto_iss = input.desconto_iss.unwrap_or(nf.desconto_iss);
        nf.outro_desconto = input.outro_desconto.unwrap_or(nf.outro_desconto);
        if input.arquivo_nota_url.is_some() {
            nf.arquivo_nota_url = input.arquivo_nota_url;
        }
        if input.observacoes.is_some() {
            nf.observacoes = input.observacoes;
        }

        // Descontos validados contra o bruto já mesclado
        validate_deductions(nf.valor_nota, nf.desconto_inss, nf.desconto_iss, nf.outro_desconto)?;
        nf.valor_liquido = compute_net_value(nf.valor_nota, nf.desconto_inss, nf.desconto_iss, nf.outro_desconto);
        nf.status = derive_invoice_status_on_edit();
        nf.updated_at = now;

        let updated = self
            .store
            .update_invoice(&nf)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Nota fiscal".into()))?;

        tracing::info!("Nota fiscal {} renegociada", updated.numero_nota);
        Ok(updated)
    }

    pub async fn mark_invoice_paid(
        &self,
        id: Uuid,
        data_pagamento: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Invoice, AppError> {
        let mut nf = self.find_or_404(id).await?;
        nf.status = InvoiceStatus::Pago;
        nf.data_pagamento = Some(data_pagamento);
        nf.updated_at = now;

        self.store
            .update_invoice(&nf)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Nota fiscal".into()))
    }

    pub async fn delete_invoice(&self, id: Uuid) -> Result<(), AppError> {
        if self.store.count_measurements_for_invoice(id).await? > 0 {
            return Err(AppError::InvoiceHasMeasurements(id));
        }
        if !self.store.delete_invoice(id).await? {
            return Err(AppError::ResourceNotFound("Nota fiscal".into()));
        }
        tracing::info!("Nota fiscal {} excluída", id);
        Ok(())
    }

    /// Notas pendentes com vencimento anterior a hoje viram `vencido`.
    pub async fn sweep_overdue_invoices(&self, obra_id: Uuid, now: DateTime<Utc>) -> Result<u64, AppError> {
        let updated = self
            .store
            .mark_overdue_invoices(obra_id, now.date_naive(), now)
            .await?;
        if updated > 0 {
            tracing::info!("{} nota(s) da obra {} marcadas como vencidas", updated, obra_id);
        }
        Ok(updated)
    }

    /// Resumo financeiro da obra (notas por status + pagamentos diretos).
    /// Roda a varredura de vencidas antes de somar.
    pub async fn project_financial_summary(
        &self,
        obra_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ProjectFinancialSummary, AppError> {
        let notas = self.list_invoices(obra_id, &InvoiceFilters::default(), now).await?;
        let diretos = self
            .store
            .list_direct_payments(obra_id, &DirectPaymentFilters::default())
            .await?;

        let mut notas_fiscais = InvoiceTotals::default();
        for nf in &notas {
            notas_fiscais.record(nf);
        }
        let pagamentos_diretos = DirectPaymentTotals {
            total_pago: diretos.iter().map(|p| p.valor).sum(),
            quantidade: diretos.len(),
        };

        Ok(ProjectFinancialSummary {
            obra_id,
            faturamento_total: notas_fiscais.total_emitido + pagamentos_diretos.total_pago,
            total_recebido: notas_fiscais.total_pago + pagamentos_diretos.total_pago,
            total_a_receber: notas_fiscais.total_pendente + notas_fiscais.total_vencido,
            notas_fiscais,
            pagamentos_diretos,
        })
    }

    // =========================================================================
    //  MEDIÇÕES
    // =========================================================================

    pub async fn create_measurement(
        &self,
        obra_id: Uuid,
        input: CreateMeasurementInput,
    ) -> Result<Measurement, AppError> {
        input.validate()?;

        if let Some(nf_id) = input.nota_fiscal_id {
            self.ensure_invoice_in_project(nf_id, obra_id).await?;
        }

        let medicao = self.store.insert_measurement(obra_id, &input).await?;
        tracing::info!("Medição nº {} criada na obra {}", medicao.numero_medicao, obra_id);
        Ok(medicao)
    }

    pub async fn get_measurement(&self, id: Uuid) -> Result<Measurement, AppError> {
        self.store
            .find_measurement(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Medição".into()))
    }

    /// Edição parcial. Obra e número da medição não mudam.
    pub async fn update_measurement(
        &self,
        id: Uuid,
        input: UpdateMeasurementInput,
        now: DateTime<Utc>,
    ) -> Result<Measurement, AppError> {
        input.validate()?;

        let mut medicao = self.get_measurement(id).await?;
        if let Some(nf_id) = input.nota_fiscal_id {
            self.ensure_invoice_in_project(nf_id, medicao.obra_id).await?;
            medicao.nota_fiscal_id = Some(nf_id);
        }
        if let Some(descricao) = input.descricao {
            medicao.descricao = descricao;
        }
        if let Some(url) = input.arquivo_medicao_url {
            medicao.arquivo_medicao_url = url;
        }
        medicao.data_medicao = input.data_medicao.unwrap_or(medicao.data_medicao);
        medicao.updated_at = now;

        self.store
            .update_measurement(&medicao)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Medição".into()))
    }

    pub async fn list_measurements(&self, obra_id: Uuid) -> Result<Vec<Measurement>, AppError> {
        self.store.list_measurements(obra_id).await
    }

    pub async fn list_measurements_by_invoice(&self, nota_fiscal_id: Uuid) -> Result<Vec<Measurement>, AppError> {
        self.store.list_measurements_by_invoice(nota_fiscal_id).await
    }

    pub async fn delete_measurement(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_measurement(id).await? {
            return Err(AppError::ResourceNotFound("Medição".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::FixtureFinanceRepository;
    use chrono::{Days, Duration, TimeZone};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap()
    }

    fn service() -> InvoiceService {
        InvoiceService::new(Arc::new(FixtureFinanceRepository::new()))
    }

    fn input(vencimento: NaiveDate) -> CreateInvoiceInput {
        CreateInvoiceInput {
            numero_nota: " nf-2025-010 ".into(),
            valor_nota: dec!(10000),
            vencimento,
            desconto_inss: dec!(1100),
            desconto_iss: dec!(500),
            outro_desconto: dec!(0),
            arquivo_nota_url: None,
            observacoes: None,
        }
    }

    fn measurement(nota_fiscal_id: Option<Uuid>) -> CreateMeasurementInput {
        CreateMeasurementInput {
            nota_fiscal_id,
            descricao: "Medição da Rua A".into(),
            arquivo_medicao_url: "https://arquivos/medicao-a.pdf".into(),
            data_medicao: now().date_naive(),
        }
    }

    #[tokio::test]
    async fn create_normalizes_and_computes_net() {
        let service = service();
        let obra = Uuid::new_v4();
        let nf = service
            .create_invoice(obra, input(now().date_naive() + Days::new(30)), now())
            .await
            .unwrap();

        assert_eq!(nf.numero_nota, "NF-2025-010");
        assert_eq!(nf.valor_liquido, dec!(8400));
        assert_eq!(nf.status, InvoiceStatus::Pendente);
    }

    #[tokio::test]
    async fn create_with_past_due_is_overdue() {
        let service = service();
        let nf = service
            .create_invoice(Uuid::new_v4(), input(now().date_naive() - Days::new(1)), now())
            .await
            .unwrap();
        assert_eq!(nf.status, InvoiceStatus::Vencido);
    }

    #[tokio::test]
    async fn create_rejects_excess_deductions_before_writing() {
        let service = service();
        let obra = Uuid::new_v4();
        let mut bad = input(now().date_naive());
        bad.outro_desconto = dec!(8400.01);

        let err = service.create_invoice(obra, bad, now()).await.unwrap_err();
        assert!(matches!(err, AppError::DeductionsExceedGross { .. }));
        assert!(service.list_invoices(obra, &InvoiceFilters::default(), now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn any_edit_renegotiates_and_recomputes_net() {
        let service = service();
        let nf = service
            .create_invoice(Uuid::new_v4(), input(now().date_naive() + Days::new(30)), now())
            .await
            .unwrap();

        let edited = service
            .update_invoice(
                nf.id,
                UpdateInvoiceInput {
                    outro_desconto: Some(dec!(400)),
                    ..Default::default()
                },
                now(),
            )
            .await
            .unwrap();

        assert_eq!(edited.status, InvoiceStatus::Renegociado);
        assert_eq!(edited.valor_liquido, dec!(8000));
        assert_eq!(edited.numero_nota, "NF-2025-010");

        // Bruto reduzido abaixo dos descontos salvos é rejeitado
        let err = service
            .update_invoice(
                nf.id,
                UpdateInvoiceInput {
                    valor_nota: Some(dec!(1000)),
                    ..Default::default()
                },
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DeductionsExceedGross { .. }));
    }

    #[tokio::test]
    async fn list_sweeps_overdue_invoices_of_the_project() {
        let service = service();
        let obra = Uuid::new_v4();
        let today = now().date_naive();
        service.create_invoice(obra, input(today + Days::new(2)), now()).await.unwrap();
        let other = service.create_invoice(Uuid::new_v4(), input(today + Days::new(2)), now()).await.unwrap();

        let later = now() + Duration::days(5);
        let listed = service.list_invoices(obra, &InvoiceFilters::default(), later).await.unwrap();
        assert_eq!(listed[0].status, InvoiceStatus::Vencido);
        assert_eq!(listed[0].updated_at, later);

        // Outra obra não é varrida
        assert_eq!(service.get_invoice(other.id).await.unwrap().status, InvoiceStatus::Pendente);
    }

    #[tokio::test]
    async fn delete_is_blocked_by_linked_measurements() {
        let service = service();
        let obra = Uuid::new_v4();
        let nf = service
            .create_invoice(obra, input(now().date_naive()), now())
            .await
            .unwrap();
        let medicao = service.create_measurement(obra, measurement(Some(nf.id))).await.unwrap();

        let err = service.delete_invoice(nf.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvoiceHasMeasurements(id) if id == nf.id));

        service.delete_measurement(medicao.id).await.unwrap();
        service.delete_invoice(nf.id).await.unwrap();
        assert!(matches!(service.get_invoice(nf.id).await, Err(AppError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn mark_paid_records_payment_date() {
        let service = service();
        let nf = service
            .create_invoice(Uuid::new_v4(), input(now().date_naive()), now())
            .await
            .unwrap();
        let paid_on = now().date_naive() + Days::new(1);

        let paid = service.mark_invoice_paid(nf.id, paid_on, now()).await.unwrap();
        assert_eq!(paid.status, InvoiceStatus::Pago);
        assert_eq!(paid.data_pagamento, Some(paid_on));
    }

    #[tokio::test]
    async fn measurement_must_reference_an_invoice_of_the_same_project() {
        let service = service();
        let nf = service
            .create_invoice(Uuid::new_v4(), input(now().date_naive()), now())
            .await
            .unwrap();

        let err = service
            .create_measurement(Uuid::new_v4(), measurement(Some(nf.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
    }

    #[rstest]
    #[case(dec!(0), dec!(0))]
    #[case(dec!(1000), dec!(1000))]
    #[tokio::test]
    async fn zero_gross_is_accepted_negative_is_not(#[case] valor: Decimal, #[case] desconto: Decimal) {
        let service = service();
        let mut ok = input(now().date_naive());
        ok.valor_nota = valor;
        ok.desconto_inss = desconto;
        ok.desconto_iss = dec!(0);

        let nf = service.create_invoice(Uuid::new_v4(), ok, now()).await.unwrap();
        assert_eq!(nf.valor_liquido, dec!(0));

        let mut negative = input(now().date_naive());
        negative.valor_nota = dec!(-1);
        assert!(matches!(
            service.create_invoice(Uuid::new_v4(), negative, now()).await,
            Err(AppError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn measurement_can_be_fetched_and_edited() {
        let service = service();
        let obra = Uuid::new_v4();
        let nf = service
            .create_invoice(obra, input(now().date_naive()), now())
            .await
            .unwrap();
        let medicao = service.create_measurement(obra, measurement(None)).await.unwrap();

        let edited_at = now() + Duration::hours(2);
        let edited = service
            .update_measurement(
                medicao.id,
                UpdateMeasurementInput {
                    nota_fiscal_id: Some(nf.id),
                    descricao: Some("Medição da Rua A (revisada)".into()),
                    ..Default::default()
                },
                edited_at,
            )
            .await
            .unwrap();

        assert_eq!(edited.nota_fiscal_id, Some(nf.id));
        assert_eq!(edited.numero_medicao, medicao.numero_medicao);
        assert_eq!(edited.arquivo_medicao_url, medicao.arquivo_medicao_url);
        assert_eq!(edited.updated_at, edited_at);
        assert_eq!(service.get_measurement(medicao.id).await.unwrap().descricao, "Medição da Rua A (revisada)");

        // Agora a nota tem medição vinculada
        assert!(matches!(service.delete_invoice(nf.id).await, Err(AppError::InvoiceHasMeasurements(_))));
    }

    #[tokio::test]
    async fn measurement_edit_rejects_invoice_of_another_project() {
        let service = service();
        let obra = Uuid::new_v4();
        let foreign = service
            .create_invoice(Uuid::new_v4(), input(now().date_naive()), now())
            .await
            .unwrap();
        let medicao = service.create_measurement(obra, measurement(None)).await.unwrap();

        let err = service
            .update_measurement(
                medicao.id,
                UpdateMeasurementInput {
                    nota_fiscal_id: Some(foreign.id),
                    ..Default::default()
                },
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
        assert!(matches!(service.get_measurement(Uuid::new_v4()).await, Err(AppError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn summary_breaks_invoices_down_by_status() {
        let repo = Arc::new(FixtureFinanceRepository::seeded(now().date_naive()));
        let service = InvoiceService::new(repo);
        let obra = crate::db::fixture_repo::SEED_OBRA_PRINCIPAL;
        let today = now().date_naive();

        // Seed: NF-2025-001 de 10.000 pendente, pagamentos diretos 15.000 + 25.000
        let vencida = service.create_invoice(obra, input(today + Days::new(1)), now()).await.unwrap();
        let paga = service.create_invoice(obra, input(today + Days::new(20)), now()).await.unwrap();
        service.mark_invoice_paid(paga.id, today, now()).await.unwrap();

        let later = now() + Duration::days(3);
        let summary = service.project_financial_summary(obra, later).await.unwrap();

        assert_eq!(service.get_invoice(vencida.id).await.unwrap().status, InvoiceStatus::Vencido);
        assert_eq!(summary.notas_fiscais.total_emitido, dec!(30000));
        assert_eq!(summary.notas_fiscais.total_pago, dec!(10000));
        assert_eq!(summary.notas_fiscais.total_pendente, dec!(10000));
        assert_eq!(summary.notas_fiscais.total_vencido, dec!(10000));
        assert_eq!(summary.pagamentos_diretos.total_pago, dec!(40000));
        assert_eq!(summary.pagamentos_diretos.quantidade, 2);
        assert_eq!(summary.faturamento_total, dec!(70000));
        assert_eq!(summary.total_recebido, dec!(50000));
        assert_eq!(summary.total_a_receber, dec!(20000));
    }
}
