// src/services/direct_payment_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::FinanceStore,
    models::direct_payments::{
        CreateDirectPaymentInput, DirectPayment, DirectPaymentFilters, UpdateDirectPaymentInput,
    },
};

#[derive(Clone)]
pub struct DirectPaymentService {
    store: Arc<dyn FinanceStore>,
}

impl DirectPaymentService {
    pub fn new(store: Arc<dyn FinanceStore>) -> Self {
        Self { store }
    }

    pub async fn create_direct_payment(
        &self,
        obra_id: Uuid,
        input: CreateDirectPaymentInput,
        now: DateTime<Utc>,
    ) -> Result<DirectPayment, AppError> {
        input.validate()?;

        if input.valor <= Decimal::ZERO {
            return Err(AppError::InvalidAmount("valor".into()));
        }

        let payment = DirectPayment {
            id: Uuid::new_v4(),
            obra_id,
            descricao: input.descricao.trim().to_string(),
            valor: input.valor,
            data_pagamento: input.data_pagamento,
            forma_pagamento: input.forma_pagamento,
            comprovante_url: input.comprovante_url,
            observacoes: input.observacoes,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert_direct_payment(&payment).await?;
        tracing::info!("Pagamento direto de {} registrado na obra {}", created.valor, obra_id);
        Ok(created)
    }

    pub async fn list_direct_payments(
        &self,
        obra_id: Uuid,
        filters: &DirectPaymentFilters,
    ) -> Result<Vec<DirectPayment>, AppError> {
        self.store.list_direct_payments(obra_id, filters).await
    }

    /// Edição parcial. A obra do pagamento não muda.
    pub async fn update_direct_payment(
        &self,
        id: Uuid,
        input: UpdateDirectPaymentInput,
        now: DateTime<Utc>,
    ) -> Result<DirectPayment, AppError> {
        input.validate()?;

        let mut payment = self
            .store
            .find_direct_payment(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento direto".into()))?;

        if let Some(valor) = input.valor {
            if valor <= Decimal::ZERO {
                return Err(AppError::InvalidAmount("valor".into()));
            }
            payment.valor = valor;
        }
        if let Some(descricao) = input.descricao {
            payment.descricao = descricao.trim().to_string();
        }
        payment.data_pagamento = input.data_pagamento.unwrap_or(payment.data_pagamento);
        payment.forma_pagamento = input.forma_pagamento.unwrap_or(payment.forma_pagamento);
        if input.comprovante_url.is_some() {
            payment.comprovante_url = input.comprovante_url;
        }
        if input.observacoes.is_some() {
            payment.observacoes = input.observacoes;
        }
        payment.updated_at = now;

        let updated = self
            .store
            .update_direct_payment(&payment)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento direto".into()))?;

        tracing::info!("Pagamento direto {} atualizado", id);
        Ok(updated)
    }

    pub async fn delete_direct_payment(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_direct_payment(id).await? {
            return Err(AppError::ResourceNotFound("Pagamento direto".into()));
        }
        Ok(())
    }
}
