// src/services/receivables_service.rs

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::FinanceStore,
    models::receivables::{
        CreateReceivableInput, Receivable, ReceivableDetail, ReceivableFilters, ReceivableStats,
        ReceivableStatus, ReceivableView, UpdateReceivableInput,
    },
    models::reports::ReportStatus,
    services::status_rules::{days_until, derive_receivable_status, due_days_text, sweep_transition},
};

/// Monta a visão integrada com os campos calculados para `today`.
pub fn build_detail(view: ReceivableView, today: NaiveDate) -> ReceivableDetail {
    let ReceivableView { pagamento, links } = view;

    let relatorio_pago = links.relatorio_status == Some(ReportStatus::Pago);
    let pagamento_pago = pagamento.status == ReceivableStatus::Pago;
    let status_unificado = if pagamento_pago || relatorio_pago {
        ReceivableStatus::Pago
    } else {
        pagamento.status
    };

    ReceivableDetail {
        dias_ate_vencimento: pagamento.effective_due_date().map(|due| days_until(due, today)),
        texto_status: due_days_text(&pagamento, today),
        tem_nota_fiscal: links.nota_fiscal_id.is_some(),
        status_unificado,
        relatorio_pago,
        pagamento_pago,
        pagamento,
        links,
    }
}

#[derive(Clone)]
pub struct ReceivablesService {
    store: Arc<dyn FinanceStore>,
}

impl ReceivablesService {
    pub fn new(store: Arc<dyn FinanceStore>) -> Self {
        Self { store }
    }

    // --- CREATE ---
    pub async fn create_receivable(
        &self,
        input: CreateReceivableInput,
        now: DateTime<Utc>,
    ) -> Result<ReceivableDetail, AppError> {
        input.validate()?;

        if input.valor_total <= Decimal::ZERO {
            return Err(AppError::InvalidAmount("valorTotal".into()));
        }
        match (input.prazo_data, input.prazo_dias) {
            (Some(_), Some(_)) => return Err(AppError::ConflictingDueDate),
            (None, None) => return Err(AppError::MissingDueDate),
            _ => {}
        }

        let observacoes = input.observacoes.filter(|o| !o.trim().is_empty());
        let mut receivable = Receivable {
            id: Uuid::new_v4(),
            relatorio_id: Some(input.relatorio_id),
            cliente_id: input.cliente_id,
            empresa_id: input.empresa_id,
            empresa_tipo: input.empresa_tipo,
            valor_total: input.valor_total,
            forma_pagamento: input.forma_pagamento,
            prazo_data: input.prazo_data,
            prazo_dias: input.prazo_dias,
            status: ReceivableStatus::Aguardando,
            observacoes,
            created_at: now,
            updated_at: now,
        };

        // Status inicial já coerente com o vencimento
        let today = now.date_naive();
        if let Some(due) = receivable.effective_due_date() {
            receivable.status = derive_receivable_status(receivable.status, due, today);
        }

        let created = self.store.insert_receivable(&receivable).await?;
        tracing::info!(
            "Pagamento a receber {} criado (status: {})",
            created.id,
            created.status.as_str()
        );

        self.get_receivable(created.id, today).await
    }

    // --- READ ---
    pub async fn get_receivable(&self, id: Uuid, today: NaiveDate) -> Result<ReceivableDetail, AppError> {
        let view = self
            .store
            .find_receivable_view(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento".into()))?;

        Ok(build_detail(view, today))
    }

    /// Lista com filtros. A varredura roda antes, para o status refletir `now`.
    pub async fn list_receivables(
        &self,
        filters: &ReceivableFilters,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReceivableDetail>, AppError> {
        self.sweep_statuses(now).await?;

        let today = now.date_naive();
        let views = self.store.list_receivable_views(filters).await?;
        Ok(views.into_iter().map(|v| build_detail(v, today)).collect())
    }

    pub async fn receivable_stats(&self, now: DateTime<Utc>) -> Result<ReceivableStats, AppError> {
        self.sweep_statuses(now).await?;

        let rows = self
            .store
            .list_receivables_by_status(&ReceivableStatus::ALL)
            .await?;

        let mut stats = ReceivableStats::default();
        for r in &rows {
            stats.record(r.status, r.valor_total);
        }
        Ok(stats)
    }

    // --- UPDATE ---

    /// Edição parcial. Se o vencimento mudar, o status é derivado de novo
    /// (exceto `pago`).
    pub async fn update_receivable(
        &self,
        id: Uuid,
        input: UpdateReceivableInput,
        now: DateTime<Utc>,
    ) -> Result<ReceivableDetail, AppError> {
        input.validate()?;

        let mut r = self
            .store
            .find_receivable(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento".into()))?;

        if let Some(valor) = input.valor_total {
            if valor <= Decimal::ZERO {
                return Err(AppError::InvalidAmount("valorTotal".into()));
            }
            r.valor_total = valor;
        }
        match (input.prazo_data, input.prazo_dias) {
            (Some(_), Some(_)) => return Err(AppError::ConflictingDueDate),
            (Some(data), None) => {
                r.prazo_data = Some(data);
                r.prazo_dias = None;
            }
            (None, Some(dias)) => {
                r.prazo_data = None;
                r.prazo_dias = Some(dias);
            }
            (None, None) => {}
        }
        if input.empresa_id.is_some() {
            r.empresa_id = input.empresa_id;
        }
        if input.empresa_tipo.is_some() {
            r.empresa_tipo = input.empresa_tipo;
        }
        r.forma_pagamento = input.forma_pagamento.unwrap_or(r.forma_pagamento);
        if let Some(obs) = input.observacoes {
            r.observacoes = Some(obs).filter(|o| !o.trim().is_empty());
        }
        r.updated_at = now;

        let updated = self
            .store
            .update_receivable(&r)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento".into()))?;

        let today = now.date_naive();
        if let Some(due) = updated.effective_due_date() {
            let next = derive_receivable_status(updated.status, due, today);
            if next != updated.status {
                self.store
                    .set_receivable_status(updated.id, updated.status, next, now)
                    .await?;
            }
        }

        tracing::info!("Pagamento a receber {} atualizado", id);
        self.get_receivable(id, today).await
    }

    // --- DELETE ---
    pub async fn delete_receivable(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_receivable(id).await? {
            return Err(AppError::ResourceNotFound("Pagamento".into()));
        }
        tracing::info!("Pagamento a receber {} excluído", id);
        Ok(())
    }

    // --- SWEEP ---

    /// Atualiza em lote os status derivados da data. Retorna quantos mudaram.
    ///
    /// Cada escrita é condicional ao status lido; se uma baixa acontecer no meio,
    /// a linha já `pago` não é tocada.
    pub async fn sweep_statuses(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let candidates = self
            .store
            .list_receivables_by_status(&[ReceivableStatus::Aguardando, ReceivableStatus::ProximoVencimento])
            .await?;

        let today = now.date_naive();
        let mut updated = 0;
        for r in candidates {
            let Some(due) = r.effective_due_date() else {
                continue;
            };
            if let Some(next) = sweep_transition(r.status, due, today) {
                if self.store.set_receivable_status(r.id, r.status, next, now).await? {
                    updated += 1;
                }
            }
        }

        if updated > 0 {
            tracing::info!("Varredura de vencimentos: {} pagamento(s) atualizado(s)", updated);
        }
        Ok(updated)
    }
}
