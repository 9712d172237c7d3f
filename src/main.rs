//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use worldpav_financeiro::config::{AppConfig, AppState};
use worldpav_financeiro::routes::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Nível de log via RUST_LOG (padrão: info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env().context("Falha ao carregar a configuração")?;
    let app_state = AppState::new(&config)
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    // Faz o app rodar as migrações do SQLx na inicialização (só no Postgres)
    if let Some(pool) = &app_state.db_pool {
        sqlx::migrate!()
            .run(pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados.")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
