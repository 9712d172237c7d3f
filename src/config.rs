// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{FinanceStore, FixtureFinanceRepository, PgFinanceRepository},
    services::{
        direct_payment_service::DirectPaymentService, invoice_service::InvoiceService,
        receivables_service::ReceivablesService, settlement_service::SettlementService,
    },
};

/// De onde vêm os dados: Postgres de verdade ou a base de demonstração em memória.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Postgres,
    Fixtures,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_source: DataSource,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let data_source = match env::var("DATA_SOURCE").unwrap_or_else(|_| "postgres".into()).as_str() {
            "postgres" => DataSource::Postgres,
            "fixtures" => DataSource::Fixtures,
            other => bail!("DATA_SOURCE inválido: '{other}' (use 'postgres' ou 'fixtures')"),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if data_source == DataSource::Postgres && database_url.is_none() {
            bail!("DATABASE_URL deve ser definida quando DATA_SOURCE=postgres");
        }

        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: '{v}'"))?,
            Err(_) => 5,
        };

        Ok(Self {
            data_source,
            database_url,
            max_connections,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    // Só existe no modo Postgres (usado pelas migrações)
    pub db_pool: Option<PgPool>,
    pub receivables_service: ReceivablesService,
    pub settlement_service: SettlementService,
    pub invoice_service: InvoiceService,
    pub direct_payment_service: DirectPaymentService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        match config.data_source {
            DataSource::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                // Conecta ao banco de dados, usando '?' para propagar erros
                let db_pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                let store = Arc::new(PgFinanceRepository::new(db_pool.clone()));
                let mut state = Self::with_store(store);
                state.db_pool = Some(db_pool);
                Ok(state)
            }
            DataSource::Fixtures => {
                tracing::warn!("Usando dados de demonstração em memória (DATA_SOURCE=fixtures)");
                let store = Arc::new(FixtureFinanceRepository::seeded(Utc::now().date_naive()));
                Ok(Self::with_store(store))
            }
        }
    }

    /// Monta o gráfico de dependências sobre qualquer fonte de dados.
    pub fn with_store(store: Arc<dyn FinanceStore>) -> Self {
        Self {
            db_pool: None,
            receivables_service: ReceivablesService::new(store.clone()),
            settlement_service: SettlementService::new(store.clone()),
            invoice_service: InvoiceService::new(store.clone()),
            direct_payment_service: DirectPaymentService::new(store),
        }
    }
}
