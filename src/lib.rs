// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub mod routes {
    use axum::{
        routing::{get, post, put},
        Router,
    };
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    use crate::{config::AppState, docs::ApiDoc, handlers};

    pub fn build_router(app_state: AppState) -> Router {
        let receivable_routes = Router::new()
            .route("/stats", get(handlers::receivables::receivable_stats))
            .route("/sweep", post(handlers::receivables::sweep_receivables))
            .route("/{id}"
                   ,get(handlers::receivables::get_receivable)
                   .put(handlers::receivables::update_receivable)
                   .delete(handlers::receivables::delete_receivable)
            )
            .route("/{id}/pay", post(handlers::receivables::mark_receivable_as_paid))
            .route("/{id}/payment-method", put(handlers::receivables::update_payment_method));

        let project_routes = Router::new()
            .route("/{obra_id}/invoices"
                   ,get(handlers::invoices::list_invoices)
                   .post(handlers::invoices::create_invoice)
            )
            .route("/{obra_id}/summary", get(handlers::invoices::project_financial_summary))
            .route("/{obra_id}/measurements"
                   ,get(handlers::invoices::list_measurements)
                   .post(handlers::invoices::create_measurement)
            )
            .route("/{obra_id}/direct-payments"
                   ,get(handlers::direct_payments::list_direct_payments)
                   .post(handlers::direct_payments::create_direct_payment)
            );

        let invoice_routes = Router::new()
            .route("/{id}"
                   ,get(handlers::invoices::get_invoice)
                   .put(handlers::invoices::update_invoice)
                   .delete(handlers::invoices::delete_invoice)
            )
            .route("/{id}/pay", post(handlers::invoices::mark_invoice_paid))
            .route("/{id}/measurements", get(handlers::invoices::list_measurements_by_invoice));

        // Combina tudo no router principal
        Router::new()
            .route("/api/health", get(|| async { "OK" }))
            .route("/api/receivables"
                   ,get(handlers::receivables::list_receivables)
                   .post(handlers::receivables::create_receivable)
            )
            .nest("/api/receivables", receivable_routes)
            .nest("/api/projects", project_routes)
            .nest("/api/invoices", invoice_routes)
            .route("/api/measurements/{id}"
                   ,get(handlers::invoices::get_measurement)
                   .put(handlers::invoices::update_measurement)
                   .delete(handlers::invoices::delete_measurement)
            )
            .route("/api/direct-payments/{id}"
                   ,put(handlers::direct_payments::update_direct_payment)
                   .delete(handlers::direct_payments::delete_direct_payment)
            )
            .route("/api/schedule/remaining-time", get(handlers::schedule::remaining_time))
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .with_state(app_state)
    }
}
