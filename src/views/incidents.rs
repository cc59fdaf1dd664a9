//! Incidents tab: the recent-incidents table.

use chrono::DateTime;
use serde::Serialize;

use crate::client::{ApiClient, Incidente};
use crate::model::{Estado, Severidad, tipo_label};

use super::ViewError;

/// Placeholder for absent fields.
const SIN_DATO: &str = "N/A";

/// One rendered table row. Every absent field has already been replaced by
/// its placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentRow {
    pub id: String,
    pub tipo: String,
    pub descripcion: String,
    pub ubicacion: String,
    pub fecha: String,
    pub severidad: Severidad,
    pub severidad_label: &'static str,
    pub estado: Estado,
    pub estado_label: &'static str,
}

/// Render model for the incidents view.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentsView {
    pub incidentes: Vec<IncidentRow>,
    pub total: usize,
}

/// Load the incidents view.
pub async fn load_incidents(
    client: &ApiClient,
    filter: Option<Severidad>,
) -> Result<IncidentsView, ViewError> {
    let incidentes = client
        .crimes_recent()
        .await
        .map_err(|error| ViewError::single("/crimes/recent", error))?;

    Ok(build(&incidentes, filter))
}

fn build(incidentes: &[Incidente], filter: Option<Severidad>) -> IncidentsView {
    let rows: Vec<IncidentRow> = incidentes
        .iter()
        .enumerate()
        .filter(|(_, inc)| {
            filter.is_none_or(|wanted| Severidad::classify(inc.severidad.as_deref()) == wanted)
        })
        .map(|(index, inc)| row(index, inc))
        .collect();

    IncidentsView {
        total: incidentes.len(),
        incidentes: rows,
    }
}

fn row(index: usize, inc: &Incidente) -> IncidentRow {
    let severidad = Severidad::classify(inc.severidad.as_deref());
    let estado = Estado::classify(inc.estado.as_deref());

    IncidentRow {
        id: inc
            .id
            .clone()
            .unwrap_or_else(|| format!("#{:03}", index + 1)),
        tipo: inc
            .tipo
            .as_deref()
            .map(tipo_label)
            .unwrap_or(SIN_DATO)
            .to_string(),
        descripcion: inc
            .descripcion
            .clone()
            .unwrap_or_else(|| "Sin descripción".to_string()),
        ubicacion: location(inc),
        fecha: inc
            .fecha
            .as_deref()
            .map(fecha_display)
            .unwrap_or_else(|| SIN_DATO.to_string()),
        severidad,
        severidad_label: severidad.label(),
        estado,
        estado_label: estado.label(),
    }
}

/// Location falls back from the place name to the municipality to raw
/// coordinates.
fn location(inc: &Incidente) -> String {
    if let Some(ubicacion) = &inc.ubicacion {
        return ubicacion.clone();
    }
    if let Some(municipio) = &inc.municipio {
        return municipio.clone();
    }
    match (inc.lat, inc.lon) {
        (Some(lat), Some(lon)) => format!("{lat}, {lon}"),
        _ => SIN_DATO.to_string(),
    }
}

/// Format an upstream timestamp for the table; unparseable values pass
/// through as-is.
fn fecha_display(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
