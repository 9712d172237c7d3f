use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Days, Duration, NaiveDate, Utc};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use worldpav_financeiro::{
    config::AppState,
    db::{fixture_repo::SEED_OBRA_PRINCIPAL, FixtureFault, FixtureFinanceRepository},
    models::reports::{ReportInvoiceStatus, ReportStatus},
    routes::build_router,
};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn app_with(repo: Arc<FixtureFinanceRepository>) -> Router {
    build_router(AppState::with_store(repo))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>, lang: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(lang) = lang {
        req = req.header(header::ACCEPT_LANGUAGE, lang);
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}

fn receivable_payload(relatorio_id: Uuid, cliente_id: Uuid, prazo_data: NaiveDate) -> Value {
    json!({
        "relatorioId": relatorio_id,
        "clienteId": cliente_id,
        "valorTotal": 10000,
        "formaPagamento": "boleto",
        "prazoData": prazo_data.to_string(),
    })
}

#[tokio::test]
async fn health_check() {
    let app = app_with(Arc::new(FixtureFinanceRepository::new()));
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn create_and_fetch_receivable() {
    let repo = Arc::new(FixtureFinanceRepository::new());
    let cliente = repo.add_client("Construtora Alfa");
    let app = app_with(repo);

    let payload = receivable_payload(Uuid::new_v4(), cliente, today() + Days::new(10));
    let (status, created) = send(&app, Method::POST, "/api/receivables", Some(payload), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "aguardando");
    assert_eq!(created["clienteNome"], "Construtora Alfa");
    assert_eq!(created["empresaNome"], "Empresa não informada");
    assert_eq!(created["diasAteVencimento"], 10);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/api/receivables/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["valorTotal"].as_f64(), Some(10000.0));
    assert_eq!(fetched["formaPagamento"], "boleto");
}

#[tokio::test]
async fn conflicting_due_date_is_localized() {
    let app = app_with(Arc::new(FixtureFinanceRepository::new()));
    let mut payload = receivable_payload(Uuid::new_v4(), Uuid::new_v4(), today());
    payload["prazoDias"] = json!(30);

    let (status, body) = send(&app, Method::POST, "/api/receivables", Some(payload.clone()), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Defina apenas prazo por data OU por dias.");
    assert_eq!(body["details"]["code"], "CONFLICTING_DUE_DATE");

    let (_, body) = send(&app, Method::POST, "/api/receivables", Some(payload), Some("en-US,en;q=0.9")).await;
    assert_eq!(body["error"], "Set either a due date or a number of days, not both.");
}

#[tokio::test]
async fn list_filters_by_status_list() {
    let repo = Arc::new(FixtureFinanceRepository::new());
    let app = app_with(repo);

    for offset in [2u64, 20] {
        let payload = receivable_payload(Uuid::new_v4(), Uuid::new_v4(), today() + Days::new(offset));
        let (status, _) = send(&app, Method::POST, "/api/receivables", Some(payload), None).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/receivables?status=proximo_vencimento,vencido",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["textoStatus"], "Vence em 2 dias");

    let (_, stats) = send(&app, Method::GET, "/api/receivables/stats", None, None).await;
    assert_eq!(stats["totalPagamentos"], 2);
    assert_eq!(stats["proximoVencimento"], 1);
}

#[tokio::test]
async fn paying_a_receivable_syncs_report_and_invoices() {
    let repo = Arc::new(FixtureFinanceRepository::new());
    let cliente = repo.add_client("Prefeitura");
    let relatorio = repo.add_report("RPT-9", cliente, today(), dec!(10000), ReportStatus::NotaEmitida);
    repo.add_report_invoice(relatorio, "NF-9", today() + Days::new(5), dec!(10000), ReportInvoiceStatus::Faturada);
    let app = app_with(repo.clone());

    let payload = receivable_payload(relatorio, cliente, today() + Days::new(5));
    let (_, created) = send(&app, Method::POST, "/api/receivables", Some(payload), None).await;
    assert_eq!(created["temNotaFiscal"], true);
    let id = created["id"].as_str().unwrap();

    let (status, outcome) = send(
        &app,
        Method::POST,
        &format!("/api/receivables/{id}/pay"),
        Some(json!({ "observacao": "Pago via boleto" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["avisos"], json!([]));
    assert_eq!(outcome["pagamento"]["status"], "pago");
    assert_eq!(outcome["pagamento"]["relatorioStatus"], "PAGO");
    assert_eq!(outcome["pagamento"]["nfStatus"], "Paga");
    assert_eq!(outcome["pagamento"]["observacoes"], "Pago via boleto");
    assert_eq!(repo.report(relatorio).unwrap().status, ReportStatus::Pago);
}

#[tokio::test]
async fn paying_with_failed_sync_still_succeeds() {
    let repo = Arc::new(FixtureFinanceRepository::new());
    let cliente = repo.add_client("Prefeitura");
    let relatorio = repo.add_report("RPT-10", cliente, today(), dec!(500), ReportStatus::AguardandoPagamento);
    repo.add_report_invoice(relatorio, "NF-10", today(), dec!(500), ReportInvoiceStatus::Faturada);
    let app = app_with(repo.clone());

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/receivables",
        Some(receivable_payload(relatorio, cliente, today())),
        None,
    )
    .await;
    let id = created["id"].as_str().unwrap();

    repo.inject_fault(FixtureFault::ReportSync);
    repo.inject_fault(FixtureFault::ReportInvoiceSync);

    let (status, outcome) = send(&app, Method::POST, &format!("/api/receivables/{id}/pay"), Some(json!({})), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["pagamento"]["status"], "pago");
    assert_eq!(outcome["avisos"].as_array().unwrap().len(), 2);
    assert_eq!(outcome["avisos"][0]["step"], "relatorio_status");
    assert_eq!(outcome["avisos"][1]["step"], "notas_fiscais_relatorio");
}

#[tokio::test]
async fn unknown_receivable_returns_404() {
    let app = app_with(Arc::new(FixtureFinanceRepository::new()));
    let uri = format!("/api/receivables/{}/pay", Uuid::new_v4());
    let (status, body) = send(&app, Method::POST, &uri, Some(json!({})), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn payment_method_can_be_changed() {
    let app = app_with(Arc::new(FixtureFinanceRepository::new()));
    let payload = receivable_payload(Uuid::new_v4(), Uuid::new_v4(), today() + Days::new(30));
    let (_, created) = send(&app, Method::POST, "/api/receivables", Some(payload), None).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/receivables/{id}/payment-method"),
        Some(json!({ "formaPagamento": "a_vista" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formaPagamento"], "a_vista");
}

#[tokio::test]
async fn invoice_deductions_are_validated() {
    let app = app_with(Arc::new(FixtureFinanceRepository::new()));
    let obra = Uuid::new_v4();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{obra}/invoices"),
        Some(json!({
            "numeroNota": "nf-77",
            "valorNota": 100,
            "vencimento": (today() + Days::new(10)).to_string(),
            "descontoInss": 50.01,
            "descontoIss": 50,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["code"], "DEDUCTIONS_EXCEED_GROSS");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{obra}/invoices"),
        Some(json!({
            "numeroNota": "nf-77",
            "valorNota": 100,
            "vencimento": (today() + Days::new(10)).to_string(),
            "descontoInss": 50,
            "descontoIss": 50,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["numeroNota"], "NF-77");
    assert_eq!(body["valorLiquido"].as_f64(), Some(0.0));
    assert_eq!(body["status"], "pendente");
}

#[tokio::test]
async fn invoice_edit_renegotiates_and_delete_respects_measurements() {
    let app = app_with(Arc::new(FixtureFinanceRepository::new()));
    let obra = Uuid::new_v4();

    let (_, nf) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{obra}/invoices"),
        Some(json!({
            "numeroNota": "NF-100",
            "valorNota": 10000,
            "vencimento": (today() + Days::new(30)).to_string(),
        })),
        None,
    )
    .await;
    let nf_id = nf["id"].as_str().unwrap().to_string();

    let (status, edited) = send(
        &app,
        Method::PUT,
        &format!("/api/invoices/{nf_id}"),
        Some(json!({ "descontoIss": 500 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["status"], "renegociado");
    assert_eq!(edited["valorLiquido"].as_f64(), Some(9500.0));

    let (status, medicao) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{obra}/measurements"),
        Some(json!({
            "notaFiscalId": nf_id,
            "descricao": "Medição 1",
            "arquivoMedicaoUrl": "https://arquivos/m1.pdf",
            "dataMedicao": today().to_string(),
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(medicao["numeroMedicao"], 1);

    let (_, linked) = send(&app, Method::GET, &format!("/api/invoices/{nf_id}/measurements"), None, None).await;
    assert_eq!(linked.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/invoices/{nf_id}"), None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["code"], "INVOICE_HAS_MEASUREMENTS");

    let medicao_id = medicao["id"].as_str().unwrap();
    let (status, _) = send(&app, Method::DELETE, &format!("/api/measurements/{medicao_id}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/invoices/{nf_id}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn summary_and_direct_payments_on_seeded_project() {
    let app = app_with(Arc::new(FixtureFinanceRepository::seeded(today())));

    let (status, created) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{SEED_OBRA_PRINCIPAL}/direct-payments"),
        Some(json!({
            "descricao": "Dinheiro - Complemento",
            "valor": 1000,
            "dataPagamento": today().to_string(),
            "formaPagamento": "dinheiro",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = send(&app, Method::GET, &format!("/api/projects/{SEED_OBRA_PRINCIPAL}/summary"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["notasFiscais"]["totalEmitido"].as_f64(), Some(10000.0));
    assert_eq!(summary["notasFiscais"]["totalPendente"].as_f64(), Some(10000.0));
    assert_eq!(summary["pagamentosDiretos"]["totalPago"].as_f64(), Some(41000.0));
    assert_eq!(summary["pagamentosDiretos"]["quantidade"], 3);
    assert_eq!(summary["faturamentoTotal"].as_f64(), Some(51000.0));
    assert_eq!(summary["totalRecebido"].as_f64(), Some(41000.0));
    assert_eq!(summary["totalAReceber"].as_f64(), Some(10000.0));

    let created_id = created["id"].as_str().unwrap();
    let (status, edited) = send(
        &app,
        Method::PUT,
        &format!("/api/direct-payments/{created_id}"),
        Some(json!({ "valor": 1500, "formaPagamento": "cheque" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["valor"].as_f64(), Some(1500.0));
    assert_eq!(edited["formaPagamento"], "cheque");
    assert_eq!(edited["descricao"], "Dinheiro - Complemento");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/direct-payments/{}", created["id"].as_str().unwrap()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(
        &app,
        Method::GET,
        &format!("/api/projects/{SEED_OBRA_PRINCIPAL}/direct-payments?formaPagamento=transferencia"),
        None,
        None,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn receivable_can_be_edited() {
    let app = app_with(Arc::new(FixtureFinanceRepository::new()));
    let payload = receivable_payload(Uuid::new_v4(), Uuid::new_v4(), today() + Days::new(30));
    let (_, created) = send(&app, Method::POST, "/api/receivables", Some(payload), None).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/receivables/{id}"),
        Some(json!({ "valorTotal": 12500, "prazoData": (today() + Days::new(1)).to_string() })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valorTotal"].as_f64(), Some(12500.0));
    assert_eq!(body["status"], "proximo_vencimento");
    assert_eq!(body["textoStatus"], "Vence em 1 dias");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/receivables/{id}"),
        Some(json!({ "valorTotal": 0 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["code"], "INVALID_AMOUNT");
}

#[tokio::test]
async fn measurement_can_be_fetched_and_edited() {
    let app = app_with(Arc::new(FixtureFinanceRepository::new()));
    let obra = Uuid::new_v4();

    let (status, medicao) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{obra}/measurements"),
        Some(json!({
            "descricao": "Medição 1",
            "arquivoMedicaoUrl": "https://arquivos/medicao-1.pdf",
            "dataMedicao": today().to_string(),
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = medicao["id"].as_str().unwrap();

    let (status, edited) = send(
        &app,
        Method::PUT,
        &format!("/api/measurements/{id}"),
        Some(json!({ "descricao": "Medição 1 - revisada" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["numeroMedicao"], 1);

    let (status, fetched) = send(&app, Method::GET, &format!("/api/measurements/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["descricao"], "Medição 1 - revisada");

    let (status, _) = send(&app, Method::GET, &format!("/api/measurements/{}", Uuid::new_v4()), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remaining_time_text() {
    let app = app_with(Arc::new(FixtureFinanceRepository::new()));
    let target = (Utc::now() + Duration::minutes(130) + Duration::seconds(30)).to_rfc3339();
    let uri = format!("/api/schedule/remaining-time?target={}", target.replace('+', "%2B"));

    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tempoRestante"], "2h 10min");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app_with(Arc::new(FixtureFinanceRepository::new()));
    let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/receivables/{id}/pay"].is_object());
}
