//! HTTP API handlers for Vigía.
//!
//! `GET /view/{tab}` is the layout shell: the tab identifier selects the
//! view, the view fetches its data and renders a JSON model, and the
//! browser layer only paints what it receives. A view that fails renders
//! its error panel payload instead; the panel's retry re-requests with
//! `refresh=true`, which evicts the view's cached responses first so every
//! request is re-issued.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::chat::{self, Conversation};
use crate::client::ApiClient;
use crate::model::{Severidad, Tab};
use crate::views;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: ApiClient,
    pub chat: Arc<Mutex<Conversation>>,
}

impl AppState {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            chat: Arc::new(Mutex::new(Conversation::new())),
        }
    }
}

/// Build the dashboard router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/view/:tab", get(get_view))
        .route("/chat", get(get_chat))
        .route("/chat/ask", post(post_chat_ask))
        .route("/chat/quick/:kind", post(post_chat_quick))
        .with_state(state)
}

/// Query parameters for the view endpoint.
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    /// Page of the paginated municipality list (overview only).
    #[serde(default)]
    pub pagina: usize,

    /// Severity filter (map and incidents table). "todos" or absent means
    /// no filter.
    pub severidad: Option<String>,

    /// Evict this view's cached responses before loading, so a manual
    /// retry re-issues every request.
    #[serde(default)]
    pub refresh: bool,
}

/// GET /view/{tab} - render the view for a sidebar tab.
///
/// Returns the view's JSON model, or its error-panel payload with
/// `502 Bad Gateway` when any of the view's upstream fetches failed.
#[instrument(skip(state, query))]
pub async fn get_view(
    State(state): State<AppState>,
    Path(tab): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Response {
    let Some(tab) = Tab::from_id(&tab) else {
        warn!(tab = %tab, "Unknown tab");
        return StatusCode::BAD_REQUEST.into_response();
    };

    if query.refresh {
        evict_view(&state.client, tab);
    }

    let filter = severity_filter(&query);

    let result = match tab {
        Tab::Dashboard => views::load_overview(&state.client, query.pagina)
            .await
            .map(|view| Json(view).into_response()),
        Tab::Analysis => views::load_analytics(&state.client)
            .await
            .map(|view| Json(view).into_response()),
        Tab::Map => views::load_map(&state.client, filter)
            .await
            .map(|view| Json(view).into_response()),
        Tab::Alerts => views::load_incidents(&state.client, filter)
            .await
            .map(|view| Json(view).into_response()),
        Tab::Chat => {
            let conversation = state.chat.lock().await;
            Ok(Json(&*conversation).into_response())
        }
    };

    match result {
        Ok(response) => {
            info!(tab = tab.id(), "View rendered");
            response
        }
        Err(error) => {
            warn!(
                tab = tab.id(),
                failures = error.failures.len(),
                "View load failed"
            );
            (StatusCode::BAD_GATEWAY, Json(error)).into_response()
        }
    }
}

/// GET /health - service liveness plus upstream reachability.
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let upstream = match state.client.health().await {
        Ok(_) => "ok",
        Err(error) => {
            warn!(error = %error, "Upstream health check failed");
            "unreachable"
        }
    };

    Json(json!({ "status": "ok", "upstream": upstream }))
}

/// GET /chat - the current chat transcript.
pub async fn get_chat(State(state): State<AppState>) -> Json<Conversation> {
    Json(state.chat.lock().await.clone())
}

/// Request body for POST /chat/ask.
#[derive(Debug, Deserialize)]
pub struct AskBody {
    pub pregunta: String,
    pub municipio: Option<String>,
    pub delito: Option<String>,
}

/// POST /chat/ask - ask the assistant a free-text question.
///
/// Returns the updated transcript. Upstream failures become an apologetic
/// bot message, never an error status.
#[instrument(skip(state, body))]
pub async fn post_chat_ask(
    State(state): State<AppState>,
    Json(body): Json<AskBody>,
) -> Json<Conversation> {
    let mut conversation = state.chat.lock().await;
    chat::ask(
        &state.client,
        &mut conversation,
        &body.pregunta,
        body.municipio.as_deref(),
        body.delito.as_deref(),
    )
    .await;

    Json(conversation.clone())
}

/// Query parameters for POST /chat/quick/{kind}.
#[derive(Debug, Deserialize)]
pub struct QuickQuery {
    pub municipio: Option<String>,
}

/// POST /chat/quick/{kind} - ask one of the canned quick questions.
#[instrument(skip(state))]
pub async fn post_chat_quick(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<QuickQuery>,
) -> Json<Conversation> {
    let mut conversation = state.chat.lock().await;
    chat::quick(
        &state.client,
        &mut conversation,
        &kind,
        query.municipio.as_deref(),
    )
    .await;

    Json(conversation.clone())
}

/// Parse the severity filter; "todos" and absent mean no filter.
fn severity_filter(query: &ViewQuery) -> Option<Severidad> {
    match query.severidad.as_deref() {
        None | Some("todos") => None,
        Some(raw) => Some(Severidad::classify(Some(raw))),
    }
}

/// Evict the cached responses a tab's view depends on.
fn evict_view(client: &ApiClient, tab: Tab) {
    let prefixes: &[&str] = match tab {
        Tab::Dashboard => &[
            "/analytics/incidents/total",
            "/analytics/response-time",
            "/analytics/crime-rate",
            "/analytics/cases/resolved",
            "/analytics/risk/predict",
            "/analytics/distribution/municipios",
        ],
        Tab::Analysis => &[
            "/analytics/prediction/trend",
            "/analytics/distribution/municipios",
            "/analytics/metrics",
        ],
        Tab::Map => &["/geo/incidents"],
        Tab::Alerts => &["/crimes/recent"],
        Tab::Chat => &[],
    };

    for prefix in prefixes {
        client.cache().evict_prefix(prefix);
    }
}
