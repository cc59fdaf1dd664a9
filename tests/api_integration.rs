//! Integration tests for the dashboard HTTP surface.
//!
//! A stub of the upstream analytics API is bound to an ephemeral port, so
//! these tests exercise the full cycle: view composition, concurrent
//! fetching, error aggregation, response memoization, and the retry
//! behavior of the error panel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_test::TestServer;
use serde_json::{Value, json};

use vigia::api::{AppState, build_router};
use vigia::client::ApiClient;

/// Shared toggles and hit counters for the stub upstream.
#[derive(Clone, Default)]
struct Upstream {
    metrics_fail: Arc<AtomicBool>,
    ask_fail: Arc<AtomicBool>,
    trend_hits: Arc<AtomicUsize>,
    metrics_hits: Arc<AtomicUsize>,
    municipios_hits: Arc<AtomicUsize>,
}

async fn stub_metrics(State(up): State<Upstream>) -> Response {
    up.metrics_hits.fetch_add(1, Ordering::SeqCst);
    if up.metrics_fail.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    } else {
        Json(json!({"roc_auc": 0.91, "pr_auc": 0.47, "report": {}})).into_response()
    }
}

async fn stub_trend(State(up): State<Upstream>) -> Json<Value> {
    up.trend_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        {"anio": 2024, "mes": 1, "reales": 5, "predichos": 2},
        {"anio": 2024, "mes": 1, "reales": 3, "predichos": 1},
        {"anio": 2024, "mes": 2, "reales": 4, "predichos": 4},
    ]))
}

async fn stub_municipios(State(up): State<Upstream>) -> Json<Value> {
    up.municipios_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        {"municipio": "BUCARAMANGA", "incidentes": 365},
        {"municipio": "FLORIDABLANCA", "incidentes": 298},
        {"municipio": "GIRÓN", "incidentes": 234},
        {"municipio": "PIEDECUESTA", "incidentes": 180},
        {"municipio": "BARRANCABERMEJA", "incidentes": 122},
        {"municipio": "SAN GIL", "incidentes": 61},
        {"municipio": "SOCORRO", "incidentes": 40},
    ]))
}

async fn stub_ask(State(up): State<Upstream>) -> Response {
    if up.ask_fail.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    } else {
        Json(json!({"respuesta": "Mantente alerta en el centro."})).into_response()
    }
}

/// Bind the stub upstream to an ephemeral port and return its origin.
async fn spawn_upstream(upstream: Upstream) -> String {
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route("/analytics/metrics", get(stub_metrics))
        .route("/analytics/prediction/trend", get(stub_trend))
        .route("/analytics/distribution/municipios", get(stub_municipios))
        .route(
            "/analytics/risk/predict",
            get(|| async {
                Json(json!({
                    "prediction": 1,
                    "probability": 0.73,
                    "anio": 2025,
                    "mes": 8,
                    "contexto": {
                        "mensaje": "Riesgo elevado en zonas céntricas.",
                        "genero_predominante": "MASCULINO",
                        "grupo_etario_predominante": "ADULTOS",
                        "dia_semana_critico": "SÁBADO",
                        "franja_horaria_critica": "NOCHE",
                        "tipo_delito_predominante": "HURTO PERSONAS",
                    },
                    "ranking": [
                        {"municipio": "BUCARAMANGA", "probabilidad": 0.81},
                        {"municipio": "GIRÓN", "probabilidad": 0.44},
                    ],
                }))
            }),
        )
        .route(
            "/analytics/incidents/total",
            get(|| async { Json(json!({"valor": 1247, "variacion_pct": 3.2})) }),
        )
        .route(
            "/analytics/response-time",
            get(|| async { Json(json!({"valor": "N/A", "variacion_pct": null})) }),
        )
        .route(
            "/analytics/crime-rate",
            get(|| async { Json(json!({"valor": 48.7, "variacion_pct": -1.4})) }),
        )
        .route(
            "/analytics/cases/resolved",
            get(|| async { Json(json!({"valor": 312, "variacion_pct": 5.0})) }),
        )
        .route(
            "/geo/incidents",
            get(|| async {
                Json(json!([
                    {"lat": 7.1254, "lon": -73.1198, "severidad": "crítica", "estado": "En Atención", "municipio": "BUCARAMANGA"},
                    {"lat": 7.0709, "lon": -73.0864, "estado": "Reportado", "municipio": "FLORIDABLANCA"},
                    {"severidad": "alta", "estado": "Resuelto", "municipio": "GIRÓN"},
                ]))
            }),
        )
        .route(
            "/crimes/recent",
            get(|| async {
                Json(json!([
                    {
                        "id": "INC-001",
                        "tipo": "hurto_personas",
                        "descripcion": "Hurto de celular",
                        "ubicacion": "Parque García Rovira",
                        "fecha": "2024-05-01T14:30:00Z",
                        "severidad": "alta",
                        "estado": "Reportado",
                    },
                    {},
                ]))
            }),
        )
        .route("/chatbot/ask", post(stub_ask))
        .route(
            "/chatbot/quick/:kind",
            get(|| async { Json(json!({"answer": "Total de eventos: 42."})) }),
        )
        .with_state(upstream);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn create_dashboard(base_url: &str) -> TestServer {
    let state = AppState::new(ApiClient::new(base_url));
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_reports_upstream() {
    let base = spawn_upstream(Upstream::default()).await;
    let server = create_dashboard(&base);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["upstream"], "ok");
}

#[tokio::test]
async fn test_health_with_unreachable_upstream() {
    // Nothing is listening on this origin
    let server = create_dashboard("http://127.0.0.1:1");

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["upstream"], "unreachable");
}

#[tokio::test]
async fn test_overview_view() {
    let base = spawn_upstream(Upstream::default()).await;
    let server = create_dashboard(&base);

    let response = server.get("/view/dashboard").await;

    response.assert_status_ok();
    let body: Value = response.json();

    let tarjetas = body["tarjetas"].as_array().unwrap();
    assert_eq!(tarjetas.len(), 4);
    assert_eq!(tarjetas[0]["valor"], "1247");
    assert_eq!(tarjetas[0]["variacion"], "↑ 3.2% vs mes anterior");
    assert_eq!(tarjetas[0]["tono"], "desfavorable");
    assert_eq!(tarjetas[1]["valor"], "N/A");
    assert_eq!(tarjetas[1]["tono"], "neutro");
    assert_eq!(tarjetas[3]["tono"], "favorable");

    // The ranking arrived under the short field name; the view sees it
    // normalized
    assert_eq!(body["riesgo"]["probability"], 0.73);
    assert_eq!(body["riesgo"]["periodo"], "8/2025");
    assert_eq!(body["riesgo"]["ranking"][0]["municipio"], "BUCARAMANGA");

    assert_eq!(body["municipios"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagina"]["page"], 0);
    assert_eq!(body["pagina"]["page_count"], 2);
}

#[tokio::test]
async fn test_overview_pagination_clamps() {
    let base = spawn_upstream(Upstream::default()).await;
    let server = create_dashboard(&base);

    let response = server.get("/view/dashboard?pagina=99").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["pagina"]["page"], 1);
    assert_eq!(body["municipios"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_analytics_view_aggregates_trend() {
    let base = spawn_upstream(Upstream::default()).await;
    let server = create_dashboard(&base);

    let response = server.get("/view/analysis").await;

    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(
        body["tendencia"],
        json!([
            {"periodo": "2024-01", "reales": 8, "predichos": 3},
            {"periodo": "2024-02", "reales": 4, "predichos": 4},
        ])
    );
    // Distribution is truncated to the chart's four bars
    assert_eq!(body["municipios"].as_array().unwrap().len(), 4);
    assert_eq!(body["roc_auc"], 0.91);
}

#[tokio::test]
async fn test_failing_endpoint_flips_whole_view_to_error() {
    let upstream = Upstream::default();
    let base = spawn_upstream(upstream.clone()).await;
    let server = create_dashboard(&base);

    upstream.metrics_fail.store(true, Ordering::SeqCst);

    let response = server.get("/view/analysis").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();

    assert_eq!(body["message"], "Error cargando datos");
    let failures = body["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["endpoint"], "/analytics/metrics");

    // No partially-populated chart: sibling requests succeeded but the
    // view renders only the error panel
    assert!(body.get("tendencia").is_none());
}

#[tokio::test]
async fn test_memoization_and_retry_reissue() {
    let upstream = Upstream::default();
    let base = spawn_upstream(upstream.clone()).await;
    let server = create_dashboard(&base);

    server.get("/view/analysis").await.assert_status_ok();
    assert_eq!(upstream.trend_hits.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.metrics_hits.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.municipios_hits.load(Ordering::SeqCst), 1);

    // A plain reload within the TTL is served from the cache
    server.get("/view/analysis").await.assert_status_ok();
    assert_eq!(upstream.trend_hits.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.metrics_hits.load(Ordering::SeqCst), 1);

    // The retry action re-issues every request of the view
    server
        .get("/view/analysis?refresh=true")
        .await
        .assert_status_ok();
    assert_eq!(upstream.trend_hits.load(Ordering::SeqCst), 2);
    assert_eq!(upstream.metrics_hits.load(Ordering::SeqCst), 2);
    assert_eq!(upstream.municipios_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_map_view_classifies_and_filters() {
    let base = spawn_upstream(Upstream::default()).await;
    let server = create_dashboard(&base);

    let response = server.get("/view/map").await;

    response.assert_status_ok();
    let body: Value = response.json();

    // The record without coordinates is not a marker, but still counts
    assert_eq!(body["total"], 3);
    assert_eq!(body["mostrando"], 2);
    assert_eq!(body["municipios"], 3);
    assert_eq!(body["en_atencion"], 1);

    // The record without a severity renders in the lowest tier
    let markers = body["markers"].as_array().unwrap();
    assert_eq!(markers[1]["severidad"], "baja");
    assert_eq!(markers[1]["severidad_label"], "Baja");
    assert_eq!(markers[0]["severidad"], "critica");
    assert_eq!(markers[0]["color"], "#dc2626");

    let filtered = server.get("/view/map?severidad=critica").await;
    filtered.assert_status_ok();
    let body: Value = filtered.json();
    assert_eq!(body["mostrando"], 1);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_incidents_view_placeholders() {
    let base = spawn_upstream(Upstream::default()).await;
    let server = create_dashboard(&base);

    let response = server.get("/view/alerts").await;

    response.assert_status_ok();
    let body: Value = response.json();

    let rows = body["incidentes"].as_array().unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["id"], "INC-001");
    assert_eq!(rows[0]["tipo"], "Hurto a personas");
    assert_eq!(rows[0]["fecha"], "01/05/2024 14:30");
    assert_eq!(rows[0]["severidad_label"], "Alta");

    // The empty record renders placeholders in every column
    assert_eq!(rows[1]["id"], "#002");
    assert_eq!(rows[1]["tipo"], "N/A");
    assert_eq!(rows[1]["descripcion"], "Sin descripción");
    assert_eq!(rows[1]["severidad"], "baja");
    assert_eq!(rows[1]["estado_label"], "Desconocido");
}

#[tokio::test]
async fn test_unknown_tab_is_rejected() {
    let base = spawn_upstream(Upstream::default()).await;
    let server = create_dashboard(&base);

    let response = server.get("/view/reports").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_flow() {
    let base = spawn_upstream(Upstream::default()).await;
    let server = create_dashboard(&base);

    // The transcript starts with the greeting
    let body: Value = server.get("/chat").await.json();
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["sender"], "bot");

    let response = server
        .post("/chat/ask")
        .json(&json!({"pregunta": "¿Dónde hay más hurtos?"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1]["sender"], "user");
    assert_eq!(messages[2]["text"], "Mantente alerta en el centro.");

    // Quick questions echo their label and normalize the `answer` spelling
    let response = server.post("/chat/quick/tendencias").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[3]["text"], "Mostrar tendencias de delitos");
    assert_eq!(messages[4]["text"], "Total de eventos: 42.");
}

#[tokio::test]
async fn test_chat_error_becomes_apology() {
    let upstream = Upstream::default();
    let base = spawn_upstream(upstream.clone()).await;
    let server = create_dashboard(&base);

    upstream.ask_fail.store(true, Ordering::SeqCst);

    let response = server
        .post("/chat/ask")
        .json(&json!({"pregunta": "¿Es seguro el centro?"}))
        .await;

    // The chat never shows the error panel
    response.assert_status_ok();
    let body: Value = response.json();
    let messages = body["messages"].as_array().unwrap();
    assert!(
        messages
            .last()
            .unwrap()["text"]
            .as_str()
            .unwrap()
            .starts_with("Disculpa")
    );
}
