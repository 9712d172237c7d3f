// src/db/finance_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::FinanceStore,
    models::{
        direct_payments::{DirectPayment, DirectPaymentFilters},
        invoices::{CreateMeasurementInput, Invoice, InvoiceFilters, Measurement},
        receivables::{PaymentMethod, Receivable, ReceivableFilters, ReceivableStatus, ReceivableView},
        reports::{ReportInvoiceStatus, ReportStatus},
    },
};

const RECEIVABLE_COLUMNS: &str = "id, relatorio_id, cliente_id, empresa_id, empresa_tipo, valor_total, \
     forma_pagamento, prazo_data, prazo_dias, status, observacoes, created_at, updated_at";

const INVOICE_COLUMNS: &str = "id, obra_id, numero_nota, valor_nota, desconto_inss, desconto_iss, \
     outro_desconto, valor_liquido, vencimento, status, data_pagamento, arquivo_nota_url, observacoes, \
     created_at, updated_at";

const MEASUREMENT_COLUMNS: &str = "id, obra_id, nota_fiscal_id, descricao, arquivo_medicao_url, \
     data_medicao, numero_medicao, created_at, updated_at";

const DIRECT_PAYMENT_COLUMNS: &str = "id, obra_id, descricao, valor, data_pagamento, forma_pagamento, \
     comprovante_url, observacoes, created_at, updated_at";

/// Implementação Postgres. Cada chamada usa o pool direto (auto-commit).
#[derive(Clone)]
pub struct PgFinanceRepository {
    pool: PgPool,
}

impl PgFinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    (!values.is_empty()).then(|| values.to_vec())
}

#[async_trait]
impl FinanceStore for PgFinanceRepository {
    // =========================================================================
    //  PAGAMENTOS A RECEBER
    // =========================================================================

    async fn insert_receivable(&self, r: &Receivable) -> Result<Receivable, AppError> {
        let sql = format!(
            r#"
            INSERT INTO pagamentos_receber ({RECEIVABLE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {RECEIVABLE_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Receivable>(&sql)
            .bind(r.id)
            .bind(r.relatorio_id)
            .bind(r.cliente_id)
            .bind(r.empresa_id)
            .bind(r.empresa_tipo)
            .bind(r.valor_total)
            .bind(r.forma_pagamento)
            .bind(r.prazo_data)
            .bind(r.prazo_dias)
            .bind(r.status)
            .bind(r.observacoes.as_deref())
            .bind(r.created_at)
            .bind(r.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_receivable(&self, id: Uuid) -> Result<Option<Receivable>, AppError> {
        let sql = format!("SELECT {RECEIVABLE_COLUMNS} FROM pagamentos_receber WHERE id = $1");

        let receivable = sqlx::query_as::<_, Receivable>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(receivable)
    }

    async fn find_receivable_view(&self, id: Uuid) -> Result<Option<ReceivableView>, AppError> {
        let view = sqlx::query_as::<_, ReceivableView>(
            "SELECT * FROM view_pagamentos_receber_integrado WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(view)
    }

    async fn list_receivable_views(
        &self,
        filters: &ReceivableFilters,
    ) -> Result<Vec<ReceivableView>, AppError> {
        // Filtros opcionais: parâmetro NULL desliga a condição
        let views = sqlx::query_as::<_, ReceivableView>(
            r#"
            SELECT * FROM view_pagamentos_receber_integrado
            WHERE ($1::status_pagamento[] IS NULL OR status = ANY($1))
              AND ($2::forma_pagamento[] IS NULL OR forma_pagamento = ANY($2))
              AND ($3::uuid IS NULL OR cliente_id = $3)
              AND ($4::uuid IS NULL OR empresa_id = $4)
              AND ($5::tipo_empresa IS NULL OR empresa_tipo = $5)
              AND ($6::date IS NULL OR prazo_data >= $6)
              AND ($7::date IS NULL OR prazo_data <= $7)
              AND ($8::numeric IS NULL OR valor_total >= $8)
              AND ($9::numeric IS NULL OR valor_total <= $9)
            ORDER BY prazo_data ASC NULLS LAST, created_at DESC
            "#,
        )
            .bind(non_empty(&filters.status))
            .bind(non_empty(&filters.forma_pagamento))
            .bind(filters.cliente_id)
            .bind(filters.empresa_id)
            .bind(filters.empresa_tipo)
            .bind(filters.data_inicio)
            .bind(filters.data_fim)
            .bind(filters.valor_min)
            .bind(filters.valor_max)
            .fetch_all(&self.pool)
            .await?;

        Ok(views)
    }

    async fn list_receivables_by_status(
        &self,
        statuses: &[ReceivableStatus],
    ) -> Result<Vec<Receivable>, AppError> {
        let sql = format!(
            "SELECT {RECEIVABLE_COLUMNS} FROM pagamentos_receber WHERE status = ANY($1) ORDER BY created_at"
        );

        let rows = sqlx::query_as::<_, Receivable>(&sql)
            .bind(statuses.to_vec())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn mark_receivable_paid(
        &self,
        id: Uuid,
        observacao: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Option<Receivable>, AppError> {
        // Sem observação nova, mantém a que já existe
        let sql = format!(
            r#"
            UPDATE pagamentos_receber
            SET status = 'pago',
                observacoes = COALESCE($2, observacoes),
                updated_at = $3
            WHERE id = $1
            RETURNING {RECEIVABLE_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Receivable>(&sql)
            .bind(id)
            .bind(observacao)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn set_receivable_status(
        &self,
        id: Uuid,
        expected: ReceivableStatus,
        status: ReceivableStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE pagamentos_receber SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2",
        )
            .bind(id)
            .bind(expected)
            .bind(status)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_receivable_payment_method(
        &self,
        id: Uuid,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Option<Receivable>, AppError> {
        let sql = format!(
            r#"
            UPDATE pagamentos_receber
            SET forma_pagamento = $2, updated_at = $3
            WHERE id = $1
            RETURNING {RECEIVABLE_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Receivable>(&sql)
            .bind(id)
            .bind(method)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn update_receivable(&self, r: &Receivable) -> Result<Option<Receivable>, AppError> {
        let sql = format!(
            r#"
            UPDATE pagamentos_receber
            SET empresa_id = $2,
                empresa_tipo = $3,
                valor_total = $4,
                forma_pagamento = $5,
                prazo_data = $6,
                prazo_dias = $7,
                observacoes = $8,
                updated_at = $9
            WHERE id = $1
            RETURNING {RECEIVABLE_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Receivable>(&sql)
            .bind(r.id)
            .bind(r.empresa_id)
            .bind(r.empresa_tipo)
            .bind(r.valor_total)
            .bind(r.forma_pagamento)
            .bind(r.prazo_data)
            .bind(r.prazo_dias)
            .bind(r.observacoes.as_deref())
            .bind(r.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn delete_receivable(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM pagamentos_receber WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  RELATÓRIOS
    // =========================================================================

    async fn update_report_status(
        &self,
        report_id: Uuid,
        status: ReportStatus,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE reports SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(report_id)
            .bind(status)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn update_report_invoices_status(
        &self,
        report_id: Uuid,
        from: ReportInvoiceStatus,
        to: ReportInvoiceStatus,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE notas_fiscais
            SET status = $3, updated_at = $4
            WHERE relatorio_id = $1 AND status = $2
            "#,
        )
            .bind(report_id)
            .bind(from)
            .bind(to)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  NOTAS FISCAIS DE OBRA
    // =========================================================================

    async fn insert_invoice(&self, nf: &Invoice) -> Result<Invoice, AppError> {
        let sql = format!(
            r#"
            INSERT INTO obras_notas_fiscais ({INVOICE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Invoice>(&sql)
            .bind(nf.id)
            .bind(nf.obra_id)
            .bind(&nf.numero_nota)
            .bind(nf.valor_nota)
            .bind(nf.desconto_inss)
            .bind(nf.desconto_iss)
            .bind(nf.outro_desconto)
            .bind(nf.valor_liquido)
            .bind(nf.vencimento)
            .bind(nf.status)
            .bind(nf.data_pagamento)
            .bind(nf.arquivo_nota_url.as_deref())
            .bind(nf.observacoes.as_deref())
            .bind(nf.created_at)
            .bind(nf.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_invoice(&self, id: Uuid) -> Result<Option<Invoice>, AppError> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM obras_notas_fiscais WHERE id = $1");

        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    async fn list_invoices(
        &self,
        obra_id: Uuid,
        filters: &InvoiceFilters,
    ) -> Result<Vec<Invoice>, AppError> {
        let sql = format!(
            r#"
            SELECT {INVOICE_COLUMNS} FROM obras_notas_fiscais
            WHERE obra_id = $1
              AND ($2::obra_nota_status IS NULL OR status = $2)
              AND ($3::date IS NULL OR vencimento >= $3)
              AND ($4::date IS NULL OR vencimento <= $4)
            ORDER BY vencimento ASC
            "#
        );

        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(obra_id)
            .bind(filters.status)
            .bind(filters.data_inicio)
            .bind(filters.data_fim)
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    async fn update_invoice(&self, nf: &Invoice) -> Result<Option<Invoice>, AppError> {
        let sql = format!(
            r#"
            UPDATE obras_notas_fiscais
            SET numero_nota = $2,
                valor_nota = $3,
                desconto_inss = $4,
                desconto_iss = $5,
                outro_desconto = $6,
                valor_liquido = $7,
                vencimento = $8,
                status = $9,
                data_pagamento = $10,
                arquivo_nota_url = $11,
                observacoes = $12,
                updated_at = $13
            WHERE id = $1
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Invoice>(&sql)
            .bind(nf.id)
            .bind(&nf.numero_nota)
            .bind(nf.valor_nota)
            .bind(nf.desconto_inss)
            .bind(nf.desconto_iss)
            .bind(nf.outro_desconto)
            .bind(nf.valor_liquido)
            .bind(nf.vencimento)
            .bind(nf.status)
            .bind(nf.data_pagamento)
            .bind(nf.arquivo_nota_url.as_deref())
            .bind(nf.observacoes.as_deref())
            .bind(nf.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn delete_invoice(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM obras_notas_fiscais WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_overdue_invoices(
        &self,
        obra_id: Uuid,
        today: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE obras_notas_fiscais
            SET status = 'vencido', updated_at = $3
            WHERE obra_id = $1 AND status = 'pendente' AND vencimento < $2
            "#,
        )
            .bind(obra_id)
            .bind(today)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  MEDIÇÕES
    // =========================================================================

    async fn insert_measurement(
        &self,
        obra_id: Uuid,
        input: &CreateMeasurementInput,
    ) -> Result<Measurement, AppError> {
        // Numeração calculada no próprio INSERT; UNIQUE(obra_id, numero_medicao) barra corridas
        let sql = format!(
            r#"
            INSERT INTO obras_medicoes
                (obra_id, nota_fiscal_id, descricao, arquivo_medicao_url, data_medicao, numero_medicao)
            SELECT $1, $2, $3, $4, $5, COALESCE(MAX(numero_medicao), 0) + 1
            FROM obras_medicoes
            WHERE obra_id = $1
            RETURNING {MEASUREMENT_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Measurement>(&sql)
            .bind(obra_id)
            .bind(input.nota_fiscal_id)
            .bind(&input.descricao)
            .bind(&input.arquivo_medicao_url)
            .bind(input.data_medicao)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_measurement(&self, id: Uuid) -> Result<Option<Measurement>, AppError> {
        let sql = format!("SELECT {MEASUREMENT_COLUMNS} FROM obras_medicoes WHERE id = $1");

        let medicao = sqlx::query_as::<_, Measurement>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(medicao)
    }

    async fn update_measurement(&self, m: &Measurement) -> Result<Option<Measurement>, AppError> {
        let sql = format!(
            r#"
            UPDATE obras_medicoes
            SET nota_fiscal_id = $2,
                descricao = $3,
                arquivo_medicao_url = $4,
                data_medicao = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING {MEASUREMENT_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Measurement>(&sql)
            .bind(m.id)
            .bind(m.nota_fiscal_id)
            .bind(&m.descricao)
            .bind(&m.arquivo_medicao_url)
            .bind(m.data_medicao)
            .bind(m.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn list_measurements(&self, obra_id: Uuid) -> Result<Vec<Measurement>, AppError> {
        let sql = format!(
            "SELECT {MEASUREMENT_COLUMNS} FROM obras_medicoes WHERE obra_id = $1 ORDER BY numero_medicao"
        );

        let rows = sqlx::query_as::<_, Measurement>(&sql)
            .bind(obra_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn list_measurements_by_invoice(
        &self,
        nota_fiscal_id: Uuid,
    ) -> Result<Vec<Measurement>, AppError> {
        let sql = format!(
            "SELECT {MEASUREMENT_COLUMNS} FROM obras_medicoes WHERE nota_fiscal_id = $1 ORDER BY numero_medicao"
        );

        let rows = sqlx::query_as::<_, Measurement>(&sql)
            .bind(nota_fiscal_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn count_measurements_for_invoice(&self, nota_fiscal_id: Uuid) -> Result<i64, AppError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM obras_medicoes WHERE nota_fiscal_id = $1")
                .bind(nota_fiscal_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn delete_measurement(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM obras_medicoes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  PAGAMENTOS DIRETOS
    // =========================================================================

    async fn insert_direct_payment(&self, p: &DirectPayment) -> Result<DirectPayment, AppError> {
        let sql = format!(
            r#"
            INSERT INTO obras_pagamentos_diretos ({DIRECT_PAYMENT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {DIRECT_PAYMENT_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, DirectPayment>(&sql)
            .bind(p.id)
            .bind(p.obra_id)
            .bind(&p.descricao)
            .bind(p.valor)
            .bind(p.data_pagamento)
            .bind(p.forma_pagamento)
            .bind(p.comprovante_url.as_deref())
            .bind(p.observacoes.as_deref())
            .bind(p.created_at)
            .bind(p.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_direct_payment(&self, id: Uuid) -> Result<Option<DirectPayment>, AppError> {
        let sql = format!("SELECT {DIRECT_PAYMENT_COLUMNS} FROM obras_pagamentos_diretos WHERE id = $1");

        let payment = sqlx::query_as::<_, DirectPayment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    async fn update_direct_payment(&self, p: &DirectPayment) -> Result<Option<DirectPayment>, AppError> {
        let sql = format!(
            r#"
            UPDATE obras_pagamentos_diretos
            SET descricao = $2,
                valor = $3,
                data_pagamento = $4,
                forma_pagamento = $5,
                comprovante_url = $6,
                observacoes = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING {DIRECT_PAYMENT_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, DirectPayment>(&sql)
            .bind(p.id)
            .bind(&p.descricao)
            .bind(p.valor)
            .bind(p.data_pagamento)
            .bind(p.forma_pagamento)
            .bind(p.comprovante_url.as_deref())
            .bind(p.observacoes.as_deref())
            .bind(p.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn list_direct_payments(
        &self,
        obra_id: Uuid,
        filters: &DirectPaymentFilters,
    ) -> Result<Vec<DirectPayment>, AppError> {
        let sql = format!(
            r#"
            SELECT {DIRECT_PAYMENT_COLUMNS} FROM obras_pagamentos_diretos
            WHERE obra_id = $1
              AND ($2::forma_pagamento_direto IS NULL OR forma_pagamento = $2)
              AND ($3::date IS NULL OR data_pagamento >= $3)
              AND ($4::date IS NULL OR data_pagamento <= $4)
            ORDER BY data_pagamento DESC
            "#
        );

        let rows = sqlx::query_as::<_, DirectPayment>(&sql)
            .bind(obra_id)
            .bind(filters.forma_pagamento)
            .bind(filters.data_inicio)
            .bind(filters.data_fim)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn delete_direct_payment(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM obras_pagamentos_diretos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
