//! Overview tab: stat cards, risk prediction, municipality distribution.

use serde::Serialize;

use crate::aggregation::{MUNICIPIOS_PAGE_SIZE, Pager};
use crate::client::{ApiClient, MunicipioCount, RankedMunicipio, RiskContext, StatCard};

use super::{ViewError, push_failure};

/// Tone of a stat-card variation, for the caption color.
///
/// For most cards growth is bad news (more incidents); for resolved cases
/// it is good, so each card declares which direction is favorable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tono {
    Favorable,
    Desfavorable,
    Neutro,
}

/// One rendered stat card.
#[derive(Debug, Clone, Serialize)]
pub struct StatCardModel {
    pub titulo: &'static str,
    pub valor: String,
    pub variacion: String,
    pub tono: Tono,
}

/// The risk-prediction panel.
#[derive(Debug, Clone, Serialize)]
pub struct RiskPanel {
    pub probability: f64,

    /// "mes/anio" the prediction is for, when the upstream says.
    pub periodo: Option<String>,

    pub contexto: Option<RiskContext>,

    /// Critical-municipality ranking, normalized at the client boundary.
    pub ranking: Vec<RankedMunicipio>,
}

/// Render model for the overview view.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewView {
    pub tarjetas: Vec<StatCardModel>,
    pub riesgo: RiskPanel,

    /// The current page of the municipality list.
    pub municipios: Vec<MunicipioCount>,
    pub pagina: Pager,
}

/// Load the overview view.
///
/// Six concurrent fetches; all settle before rendering, and any failure
/// flips the whole view to its error state.
pub async fn load_overview(client: &ApiClient, page: usize) -> Result<OverviewView, ViewError> {
    let (total, acumulado, tasa, resueltos, riesgo, municipios) = tokio::join!(
        client.incidents_total(),
        client.response_time(),
        client.crime_rate(),
        client.cases_resolved(),
        client.risk_predict(None, None, None),
        client.municipios_distribution(),
    );

    match (total, acumulado, tasa, resueltos, riesgo, municipios) {
        (Ok(total), Ok(acumulado), Ok(tasa), Ok(resueltos), Ok(riesgo), Ok(municipios)) => {
            let tarjetas = vec![
                card("Incidentes Registrados", &total, false),
                card(
                    "Acumulado de Incidentes en los últimos 90 días",
                    &acumulado,
                    false,
                ),
                card("Tasa Departamental de Criminalidad", &tasa, false),
                card("Casos de Criminalidad Resueltos", &resueltos, true),
            ];

            let pagina = Pager::new(municipios.len(), MUNICIPIOS_PAGE_SIZE, page);
            let visibles = pagina.slice(&municipios).to_vec();

            let periodo = match (riesgo.mes, riesgo.anio) {
                (Some(mes), Some(anio)) => Some(format!("{mes}/{anio}")),
                _ => None,
            };

            Ok(OverviewView {
                tarjetas,
                riesgo: RiskPanel {
                    probability: riesgo.probability,
                    periodo,
                    contexto: riesgo.contexto.clone(),
                    ranking: riesgo.ranking().to_vec(),
                },
                municipios: visibles,
                pagina,
            })
        }
        (total, acumulado, tasa, resueltos, riesgo, municipios) => {
            let mut failures = Vec::new();
            push_failure("/analytics/incidents/total", total, &mut failures);
            push_failure("/analytics/response-time", acumulado, &mut failures);
            push_failure("/analytics/crime-rate", tasa, &mut failures);
            push_failure("/analytics/cases/resolved", resueltos, &mut failures);
            push_failure("/analytics/risk/predict", riesgo, &mut failures);
            push_failure("/analytics/distribution/municipios", municipios, &mut failures);
            Err(ViewError::new(failures))
        }
    }
}

fn card(titulo: &'static str, stat: &StatCard, mas_es_mejor: bool) -> StatCardModel {
    StatCardModel {
        titulo,
        valor: stat.valor.display(),
        variacion: stat.variation_label(),
        tono: variation_tone(stat.variacion_pct, mas_es_mejor),
    }
}

fn variation_tone(variacion_pct: Option<f64>, mas_es_mejor: bool) -> Tono {
    match variacion_pct {
        None => Tono::Neutro,
        Some(pct) => {
            let subiendo = pct > 0.0;
            if subiendo == mas_es_mejor {
                Tono::Favorable
            } else {
                Tono::Desfavorable
            }
        }
    }
}
