//! HTTP client for the Santander security analytics API.
//!
//! One method per upstream endpoint, all against a single base origin
//! configured through `VIGIA_API_BASE`. Responses are deserialized with
//! lenient defaults; the UI substitutes placeholders for anything absent.
//!
//! Shape quirks of the upstream are normalized here and nowhere else:
//! the chatbot reply has been served under three different field names
//! (plus a bare string body), and the risk-prediction municipality ranking
//! under two. The rest of the crate sees one typed contract.
//!
//! # Failure contract
//!
//! Transport failures and non-2xx statuses collapse into the same
//! user-visible "request failed" condition. There are no retries, no
//! timeout overrides, and no response-shape validation beyond the serde
//! defaults; a failed request surfaces immediately to the calling view.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::ResponseCache;

/// Default base origin when `VIGIA_API_BASE` is unset.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// A failed upstream request.
///
/// Transport errors and non-success statuses are deliberately framed the
/// same way; the error panel only needs "request failed" plus detail.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure (unreachable host, connection reset, body
    /// read error).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("request failed: {path} returned HTTP {status}")]
    Status {
        path: String,
        status: reqwest::StatusCode,
    },

    /// The body was not the JSON shape the endpoint documents.
    #[error("request failed: unexpected response body ({0})")]
    Decode(#[from] serde_json::Error),
}

/// Client for the analytics API. Cheap to clone; the whole dashboard
/// shares one instance so overlapping fetches hit the response cache.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    cache: Arc<ResponseCache>,
}

impl ApiClient {
    /// Create a client against the given base origin.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: Arc::new(ResponseCache::default()),
        }
    }

    /// The response cache, exposed for the retry action's eviction.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// One uncached round trip, returning the raw JSON body.
    async fn fetch_value(&self, path_and_query: &str) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                path: path_and_query.to_string(),
                status: response.status(),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// GET through the memoization cache, keyed by path + query.
    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, ApiError> {
        if let Some(hit) = self.cache.get(path_and_query) {
            return Ok(serde_json::from_value(hit)?);
        }

        let body = self.fetch_value(path_and_query).await?;
        self.cache.put(path_and_query, body.clone());
        Ok(serde_json::from_value(body)?)
    }

    /// POST with a JSON body. Never cached.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status: response.status(),
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// GET /health - upstream liveness. Bypasses the cache.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let body = self.fetch_value("/health").await?;
        Ok(serde_json::from_value(body)?)
    }

    /// GET /analytics/metrics - model quality metrics.
    pub async fn metrics(&self) -> Result<ModelMetrics, ApiError> {
        self.get_json("/analytics/metrics").await
    }

    /// GET /analytics/prediction/trend - actual vs predicted counts over
    /// time, at whatever granularity the model was evaluated on.
    pub async fn prediction_trend(&self) -> Result<Vec<TrendPoint>, ApiError> {
        self.get_json("/analytics/prediction/trend").await
    }

    /// GET /analytics/risk/predict - risk prediction for a municipality
    /// and period. Year and month default to the current date.
    pub async fn risk_predict(
        &self,
        municipio: Option<&str>,
        anio: Option<i32>,
        mes: Option<u32>,
    ) -> Result<RiskPrediction, ApiError> {
        let today = Utc::now();
        let anio = anio.unwrap_or_else(|| today.year());
        let mes = mes.unwrap_or_else(|| today.month());

        let mut path = format!("/analytics/risk/predict?anio={anio}&mes={mes}");
        if let Some(m) = municipio {
            path.push_str(&format!("&municipio={}", urlencoding::encode(m)));
        }

        self.get_json(&path).await
    }

    /// GET /analytics/distribution/municipios - incident totals per
    /// municipality, ordered by the upstream.
    pub async fn municipios_distribution(&self) -> Result<Vec<MunicipioCount>, ApiError> {
        self.get_json("/analytics/distribution/municipios").await
    }

    /// GET /analytics/incidents/total - registered incidents stat card.
    pub async fn incidents_total(&self) -> Result<StatCard, ApiError> {
        self.get_json("/analytics/incidents/total").await
    }

    /// GET /analytics/response-time - 90-day accumulated incidents stat
    /// card.
    pub async fn response_time(&self) -> Result<StatCard, ApiError> {
        self.get_json("/analytics/response-time").await
    }

    /// GET /analytics/crime-rate - departmental crime rate stat card.
    pub async fn crime_rate(&self) -> Result<StatCard, ApiError> {
        self.get_json("/analytics/crime-rate").await
    }

    /// GET /analytics/cases/resolved - resolved cases stat card.
    pub async fn cases_resolved(&self) -> Result<StatCard, ApiError> {
        self.get_json("/analytics/cases/resolved").await
    }

    /// GET /geo/incidents - incident points for the map.
    pub async fn geo_incidents(&self) -> Result<Vec<GeoIncident>, ApiError> {
        self.get_json("/geo/incidents").await
    }

    /// GET /crimes/recent - the rich incident records behind the table.
    pub async fn crimes_recent(&self) -> Result<Vec<Incidente>, ApiError> {
        self.get_json("/crimes/recent").await
    }

    /// POST /crimes/query - filtered incident query.
    pub async fn crimes_query(&self, query: &CrimeQuery) -> Result<Vec<CrimeRecord>, ApiError> {
        self.post_json("/crimes/query", query).await
    }

    /// POST /chatbot/ask - free-text question for the assistant.
    pub async fn chatbot_ask(
        &self,
        pregunta: &str,
        municipio: Option<&str>,
        delito: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let body = ChatAsk {
            pregunta: pregunta.to_string(),
            municipio: municipio.map(str::to_string),
            delito: delito.map(str::to_string),
        };
        self.post_json("/chatbot/ask", &body).await
    }

    /// GET /chatbot/quick/{kind} - canned quick question.
    pub async fn chatbot_quick(
        &self,
        kind: &str,
        municipio: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let mut path = format!("/chatbot/quick/{}", urlencoding::encode(kind));
        if let Some(m) = municipio {
            path.push_str(&format!("?municipio={}", urlencoding::encode(m)));
        }
        self.get_json(&path).await
    }
}

// ============================================================================
// Response types
// ============================================================================

/// Response from GET /health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

/// Model quality metrics from GET /analytics/metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default)]
    pub roc_auc: f64,

    #[serde(default)]
    pub pr_auc: f64,

    /// Full classification report; passed through untyped.
    #[serde(default)]
    pub report: Value,
}

/// One trend row: actual and predicted incident counts for a period.
///
/// Year and month are typed integers at this boundary, so a malformed row
/// deserializes with zeros and groups under "0-00" instead of producing an
/// unparseable period key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(default)]
    pub anio: i32,

    #[serde(default)]
    pub mes: u32,

    /// Recorded incident count.
    #[serde(default)]
    pub reales: i64,

    /// Model-predicted incident count.
    #[serde(default)]
    pub predichos: i64,
}

/// Incident total for one municipality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MunicipioCount {
    #[serde(default)]
    pub municipio: String,

    #[serde(default)]
    pub incidentes: i64,
}

/// An incident point for the map. Everything is optional; records without
/// coordinates are skipped by the map view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIncident {
    #[serde(default)]
    pub lat: Option<f64>,

    #[serde(default)]
    pub lon: Option<f64>,

    #[serde(default)]
    pub severidad: Option<String>,

    #[serde(default)]
    pub estado: Option<String>,

    #[serde(default)]
    pub municipio: Option<String>,
}

/// A rich incident record from GET /crimes/recent.
///
/// The table treats every field as optional and substitutes placeholders,
/// so nothing here is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incidente {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub tipo: Option<String>,

    #[serde(default)]
    pub descripcion: Option<String>,

    #[serde(default)]
    pub ubicacion: Option<String>,

    #[serde(default)]
    pub municipio: Option<String>,

    #[serde(default)]
    pub fecha: Option<String>,

    #[serde(default)]
    pub severidad: Option<String>,

    #[serde(default)]
    pub estado: Option<String>,

    #[serde(default)]
    pub lat: Option<f64>,

    #[serde(default)]
    pub lon: Option<f64>,
}

/// Filter body for POST /crimes/query.
#[derive(Debug, Clone, Serialize)]
pub struct CrimeQuery {
    pub departamento: String,
    pub municipio: Option<String>,
    pub tipo_delito: Option<String>,
    pub anio: Option<i32>,
    pub mes: Option<u32>,
    pub limit: u32,
}

impl Default for CrimeQuery {
    fn default() -> Self {
        Self {
            departamento: "SANTANDER".to_string(),
            municipio: None,
            tipo_delito: None,
            anio: None,
            mes: None,
            limit: 100,
        }
    }
}

/// One row from POST /crimes/query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrimeRecord {
    #[serde(default)]
    pub departamento: String,

    #[serde(default)]
    pub municipio: Option<String>,

    #[serde(default)]
    pub fecha_hecho: String,

    #[serde(default)]
    pub tipo_delito: String,

    #[serde(default)]
    pub cantidad: i64,
}

/// Request body for POST /chatbot/ask.
#[derive(Debug, Clone, Serialize)]
struct ChatAsk {
    pregunta: String,
    municipio: Option<String>,
    delito: Option<String>,
}

/// Chatbot reply, tolerant of the field spellings the upstream has used
/// (`respuesta`, `answer`, `response`) as well as a bare string body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    /// The whole body was a string.
    Text(String),

    /// An object carrying the reply under one of the known names.
    Fields {
        #[serde(default)]
        respuesta: Option<String>,
        #[serde(default)]
        answer: Option<String>,
        #[serde(default)]
        response: Option<String>,
    },
}

impl ChatReply {
    /// The reply text, if the upstream produced one under any known name.
    pub fn into_text(self) -> Option<String> {
        match self {
            ChatReply::Text(text) => Some(text),
            ChatReply::Fields {
                respuesta,
                answer,
                response,
            } => respuesta.or(answer).or(response),
        }
    }
}

/// Risk prediction from GET /analytics/risk/predict.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskPrediction {
    #[serde(default)]
    pub prediction: i64,

    #[serde(default)]
    pub probability: f64,

    #[serde(default)]
    pub anio: Option<i32>,

    #[serde(default)]
    pub mes: Option<u32>,

    /// Narrative context for the prediction, when the upstream has one.
    #[serde(default)]
    pub contexto: Option<RiskContext>,

    // The ranking has been served under both names; `ranking()` is the
    // normalized accessor.
    #[serde(default)]
    ranking_municipios: Vec<RankedMunicipio>,

    #[serde(default)]
    ranking: Vec<RankedMunicipio>,

    #[serde(default)]
    pub used_features: Value,
}

impl RiskPrediction {
    /// Municipality ranking regardless of which field name the upstream
    /// used.
    pub fn ranking(&self) -> &[RankedMunicipio] {
        if self.ranking_municipios.is_empty() {
            &self.ranking
        } else {
            &self.ranking_municipios
        }
    }
}

/// Narrative context attached to a risk prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskContext {
    #[serde(default)]
    pub mensaje: String,

    #[serde(default)]
    pub genero_predominante: String,

    #[serde(default)]
    pub grupo_etario_predominante: String,

    #[serde(default)]
    pub dia_semana_critico: String,

    #[serde(default)]
    pub franja_horaria_critica: String,

    #[serde(default)]
    pub tipo_delito_predominante: String,
}

/// One entry of the critical-municipality ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMunicipio {
    #[serde(default)]
    pub municipio: String,

    #[serde(default)]
    pub probabilidad: f64,
}

/// A stat-card value from the overview endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatCard {
    #[serde(default)]
    pub valor: StatValue,

    /// Percent change versus the previous month.
    #[serde(default)]
    pub variacion_pct: Option<f64>,
}

impl StatCard {
    /// The `↑/↓ x.x% vs mes anterior` caption, or "N/A" when the upstream
    /// had no comparison.
    pub fn variation_label(&self) -> String {
        match self.variacion_pct {
            Some(pct) => {
                let arrow = if pct > 0.0 { "↑" } else { "↓" };
                format!("{} {:.1}% vs mes anterior", arrow, pct.abs())
            }
            None => "N/A".to_string(),
        }
    }
}

/// Stat value as the upstream serves it: a number, or the literal string
/// "N/A" when there is no data for the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Numero(f64),
    Texto(String),
}

impl Default for StatValue {
    fn default() -> Self {
        StatValue::Texto("N/A".to_string())
    }
}

impl StatValue {
    /// Render for the card: integers without decimals, everything else
    /// with one.
    pub fn display(&self) -> String {
        match self {
            StatValue::Numero(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            StatValue::Numero(n) => format!("{n:.1}"),
            StatValue::Texto(t) => t.clone(),
        }
    }
}
