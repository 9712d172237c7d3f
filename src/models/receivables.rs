// src/models/receivables.rs

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::reports::{ReportInvoiceStatus, ReportStatus};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_pagamento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReceivableStatus {
    Aguardando,
    ProximoVencimento, // Vence em até 3 dias
    Vencido,
    Pago, // Terminal: só a baixa manual chega aqui
}

impl ReceivableStatus {
    pub const ALL: [ReceivableStatus; 4] = [
        ReceivableStatus::Aguardando,
        ReceivableStatus::ProximoVencimento,
        ReceivableStatus::Vencido,
        ReceivableStatus::Pago,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReceivableStatus::Aguardando => "aguardando",
            ReceivableStatus::ProximoVencimento => "proximo_vencimento",
            ReceivableStatus::Vencido => "vencido",
            ReceivableStatus::Pago => "pago",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s.trim())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReceivableStatus::Pago)
    }

    /// Estados que a varredura automática ainda pode reclassificar.
    pub fn is_sweepable(&self) -> bool {
        matches!(self, ReceivableStatus::Aguardando | ReceivableStatus::ProximoVencimento)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "forma_pagamento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    SemForma,
    Pix,
    Boleto,
    AVista,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::SemForma => "sem_forma",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Boleto => "boleto",
            PaymentMethod::AVista => "a_vista",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [PaymentMethod::SemForma, PaymentMethod::Pix, PaymentMethod::Boleto, PaymentMethod::AVista]
            .into_iter()
            .find(|method| method.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_empresa", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompanyKind {
    Interna,
    Terceira,
}

// --- Structs ---

/// Linha da tabela `pagamentos_receber`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Receivable {
    pub id: Uuid,

    // Vínculos
    pub relatorio_id: Option<Uuid>,
    pub cliente_id: Uuid,
    pub empresa_id: Option<Uuid>,
    pub empresa_tipo: Option<CompanyKind>,

    #[schema(example = "10000.00")]
    pub valor_total: Decimal,
    pub forma_pagamento: PaymentMethod,

    // Prazo: por data OU por dias
    #[schema(value_type = Option<String>, format = Date, example = "2025-01-15")]
    pub prazo_data: Option<NaiveDate>,
    #[schema(example = 30)]
    pub prazo_dias: Option<i32>,

    pub status: ReceivableStatus,
    pub observacoes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Receivable {
    /// Vencimento efetivo: a data explícita ou a criação + N dias.
    pub fn effective_due_date(&self) -> Option<NaiveDate> {
        match (self.prazo_data, self.prazo_dias) {
            (Some(data), _) => Some(data),
            (None, Some(dias)) if dias >= 0 => self
                .created_at
                .date_naive()
                .checked_add_days(Days::new(dias as u64)),
            _ => None,
        }
    }
}

/// Dados relacionados que a view integrada junta ao pagamento.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableLinks {
    #[schema(example = "Construtora Alfa")]
    pub cliente_nome: Option<String>,
    pub empresa_nome: Option<String>,

    // Relatório
    #[schema(example = "RPT-2025-0042")]
    pub report_number: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub relatorio_data: Option<NaiveDate>,
    pub relatorio_valor: Option<Decimal>,
    pub relatorio_status: Option<ReportStatus>,

    // Nota fiscal do relatório (a mais recente)
    pub nota_fiscal_id: Option<Uuid>,
    pub numero_nota: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub nf_data_vencimento: Option<NaiveDate>,
    pub nf_valor: Option<Decimal>,
    pub nf_status: Option<ReportInvoiceStatus>,
}

/// O que a camada de persistência devolve para a leitura integrada.
#[derive(Debug, Clone, FromRow)]
pub struct ReceivableView {
    #[sqlx(flatten)]
    pub pagamento: Receivable,
    #[sqlx(flatten)]
    pub links: ReceivableLinks,
}

/// Visão desnormalizada devolvida para a UI (equivalente à view integrada).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableDetail {
    #[serde(flatten)]
    pub pagamento: Receivable,
    #[serde(flatten)]
    pub links: ReceivableLinks,

    // Campos calculados
    pub status_unificado: ReceivableStatus,
    pub tem_nota_fiscal: bool,
    pub relatorio_pago: bool,
    pub pagamento_pago: bool,
    pub dias_ate_vencimento: Option<i64>,
    #[schema(example = "Vence em 2 dias")]
    pub texto_status: String,
}

// --- Entradas ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceivableInput {
    pub relatorio_id: Uuid,
    pub cliente_id: Uuid,
    pub empresa_id: Option<Uuid>,
    pub empresa_tipo: Option<CompanyKind>,

    #[schema(example = "10000.00")]
    pub valor_total: Decimal,

    #[serde(default = "default_payment_method")]
    pub forma_pagamento: PaymentMethod,

    #[schema(value_type = Option<String>, format = Date, example = "2025-01-15")]
    pub prazo_data: Option<NaiveDate>,

    #[validate(range(min = 1, max = 3650, message = "prazo_dias deve estar entre 1 e 3650"))]
    pub prazo_dias: Option<i32>,

    #[validate(length(max = 2000))]
    pub observacoes: Option<String>,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::SemForma
}

/// Edição parcial do recebível. Informar `prazoData` descarta `prazoDias`
/// e vice-versa; o status não é editável por aqui.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReceivableInput {
    pub empresa_id: Option<Uuid>,
    pub empresa_tipo: Option<CompanyKind>,
    #[schema(example = "12000.00")]
    pub valor_total: Option<Decimal>,
    pub forma_pagamento: Option<PaymentMethod>,
    #[schema(value_type = Option<String>, format = Date)]
    pub prazo_data: Option<NaiveDate>,
    #[validate(range(min = 1, max = 3650, message = "prazo_dias deve estar entre 1 e 3650"))]
    pub prazo_dias: Option<i32>,
    #[validate(length(max = 2000))]
    pub observacoes: Option<String>,
}

/// Filtros da listagem de recebíveis.
#[derive(Debug, Clone, Default)]
pub struct ReceivableFilters {
    pub status: Vec<ReceivableStatus>,
    pub forma_pagamento: Vec<PaymentMethod>,
    pub cliente_id: Option<Uuid>,
    pub empresa_id: Option<Uuid>,
    pub empresa_tipo: Option<CompanyKind>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub valor_min: Option<Decimal>,
    pub valor_max: Option<Decimal>,
}

impl ReceivableFilters {
    /// Mesmo critério usado pelo repositório Postgres, para as fixtures.
    pub fn matches(&self, r: &Receivable) -> bool {
        if !self.status.is_empty() && !self.status.contains(&r.status) {
            return false;
        }
        if !self.forma_pagamento.is_empty() && !self.forma_pagamento.contains(&r.forma_pagamento) {
            return false;
        }
        if self.cliente_id.is_some_and(|id| id != r.cliente_id) {
            return false;
        }
        if self.empresa_id.is_some() && self.empresa_id != r.empresa_id {
            return false;
        }
        if self.empresa_tipo.is_some() && self.empresa_tipo != r.empresa_tipo {
            return false;
        }
        if let Some(inicio) = self.data_inicio {
            if !r.prazo_data.is_some_and(|d| d >= inicio) {
                return false;
            }
        }
        if let Some(fim) = self.data_fim {
            if !r.prazo_data.is_some_and(|d| d <= fim) {
                return false;
            }
        }
        if self.valor_min.is_some_and(|min| r.valor_total < min) {
            return false;
        }
        if self.valor_max.is_some_and(|max| r.valor_total > max) {
            return false;
        }
        true
    }
}

/// Query string da listagem (`?status=vencido,pago&formaPagamento=pix`).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReceivableQuery {
    /// Lista separada por vírgula
    pub status: Option<String>,
    /// Lista separada por vírgula
    pub forma_pagamento: Option<String>,
    pub cliente_id: Option<Uuid>,
    pub empresa_id: Option<Uuid>,
    pub empresa_tipo: Option<CompanyKind>,
    #[param(value_type = Option<String>, format = Date)]
    pub data_inicio: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub data_fim: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub valor_min: Option<Decimal>,
    #[param(value_type = Option<String>)]
    pub valor_max: Option<Decimal>,
}

impl From<ReceivableQuery> for ReceivableFilters {
    fn from(q: ReceivableQuery) -> Self {
        // Valores desconhecidos são ignorados
        let status = q
            .status
            .as_deref()
            .map(|s| s.split(',').filter_map(ReceivableStatus::parse).collect())
            .unwrap_or_default();
        let forma_pagamento = q
            .forma_pagamento
            .as_deref()
            .map(|s| s.split(',').filter_map(PaymentMethod::parse).collect())
            .unwrap_or_default();

        ReceivableFilters {
            status,
            forma_pagamento,
            cliente_id: q.cliente_id,
            empresa_id: q.empresa_id,
            empresa_tipo: q.empresa_tipo,
            data_inicio: q.data_inicio,
            data_fim: q.data_fim,
            valor_min: q.valor_min,
            valor_max: q.valor_max,
        }
    }
}

/// Contagem e valor por status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableStats {
    pub total_pagamentos: u64,
    pub total_valor: Decimal,
    pub aguardando: u64,
    pub proximo_vencimento: u64,
    pub vencido: u64,
    pub pago: u64,
    pub valor_aguardando: Decimal,
    pub valor_proximo_vencimento: Decimal,
    pub valor_vencido: Decimal,
    pub valor_pago: Decimal,
}

impl ReceivableStats {
    pub fn record(&mut self, status: ReceivableStatus, valor: Decimal) {
        self.total_pagamentos += 1;
        self.total_valor += valor;
        match status {
            ReceivableStatus::Aguardando => {
                self.aguardando += 1;
                self.valor_aguardando += valor;
            }
            ReceivableStatus::ProximoVencimento => {
                self.proximo_vencimento += 1;
                self.valor_proximo_vencimento += valor;
            }
            ReceivableStatus::Vencido => {
                self.vencido += 1;
                self.valor_vencido += valor;
            }
            ReceivableStatus::Pago => {
                self.pago += 1;
                self.valor_pago += valor;
            }
        }
    }
}

// --- Baixa (saga de sincronização) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    RelatorioStatus,
    NotasFiscaisRelatorio,
}

/// Passo secundário da baixa que falhou (não desfaz o pagamento).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncWarning {
    pub step: SyncStep,
    pub relatorio_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettlementOutcome {
    pub pagamento: ReceivableDetail,
    pub avisos: Vec<SyncWarning>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAsPaidPayload {
    #[validate(length(max = 2000))]
    #[schema(example = "Pago via boleto")]
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentMethodPayload {
    pub forma_pagamento: PaymentMethod,
}
