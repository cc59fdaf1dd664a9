//! Map tab: incident markers with severity classification and filter.

use std::collections::HashSet;

use serde::Serialize;

use crate::client::{ApiClient, GeoIncident};
use crate::model::{Estado, Severidad};

use super::ViewError;

/// One renderable marker. Records without coordinates never get here.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub municipio: String,
    pub severidad: Severidad,
    pub severidad_label: &'static str,
    pub color: &'static str,
    pub bg_color: &'static str,
    pub estado: &'static str,
}

/// Marker count for one severity tier, for the filter buttons.
#[derive(Debug, Clone, Serialize)]
pub struct SeverityCount {
    pub severidad: Severidad,
    pub label: &'static str,
    pub total: usize,
}

/// Render model for the map view.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    /// Markers after the severity filter.
    pub markers: Vec<Marker>,

    /// Footer stats, computed over all incidents regardless of filter.
    pub total: usize,
    pub mostrando: usize,
    pub en_atencion: usize,
    pub municipios: usize,

    pub por_severidad: Vec<SeverityCount>,
}

/// Load the map view.
pub async fn load_map(
    client: &ApiClient,
    filter: Option<Severidad>,
) -> Result<MapView, ViewError> {
    let incidents = client
        .geo_incidents()
        .await
        .map_err(|error| ViewError::single("/geo/incidents", error))?;

    Ok(build(&incidents, filter))
}

fn build(incidents: &[GeoIncident], filter: Option<Severidad>) -> MapView {
    let por_severidad = Severidad::ALL
        .iter()
        .map(|tier| SeverityCount {
            severidad: *tier,
            label: tier.label(),
            total: incidents
                .iter()
                .filter(|inc| Severidad::classify(inc.severidad.as_deref()) == *tier)
                .count(),
        })
        .collect();

    let en_atencion = incidents
        .iter()
        .filter(|inc| Estado::classify(inc.estado.as_deref()) == Estado::EnAtencion)
        .count();

    let municipios = incidents
        .iter()
        .filter_map(|inc| inc.municipio.as_deref())
        .collect::<HashSet<_>>()
        .len();

    let markers: Vec<Marker> = incidents
        .iter()
        .filter_map(|inc| {
            let lat = inc.lat?;
            let lon = inc.lon?;
            let severidad = Severidad::classify(inc.severidad.as_deref());
            if filter.is_some_and(|wanted| wanted != severidad) {
                return None;
            }
            Some(Marker {
                lat,
                lon,
                municipio: inc
                    .municipio
                    .clone()
                    .unwrap_or_else(|| "Municipio no especificado".to_string()),
                severidad,
                severidad_label: severidad.label(),
                color: severidad.color(),
                bg_color: severidad.bg_color(),
                estado: Estado::classify(inc.estado.as_deref()).label(),
            })
        })
        .collect();

    MapView {
        total: incidents.len(),
        mostrando: markers.len(),
        en_atencion,
        municipios,
        por_severidad,
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(
        lat: Option<f64>,
        lon: Option<f64>,
        severidad: Option<&str>,
        estado: Option<&str>,
        municipio: Option<&str>,
    ) -> GeoIncident {
        GeoIncident {
            lat,
            lon,
            severidad: severidad.map(str::to_string),
            estado: estado.map(str::to_string),
            municipio: municipio.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_coordinates_are_skipped() {
        let incidents = vec![
            incident(Some(7.1), Some(-73.1), Some("alta"), None, Some("GIRÓN")),
            incident(None, Some(-73.1), Some("crítica"), None, None),
        ];

        let view = build(&incidents, None);

        assert_eq!(view.total, 2);
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.mostrando, 1);
    }

    #[test]
    fn test_missing_severity_falls_back_to_baja() {
        let incidents = vec![incident(Some(7.1), Some(-73.1), None, None, None)];

        let view = build(&incidents, None);

        assert_eq!(view.markers[0].severidad, Severidad::Baja);
        assert_eq!(view.markers[0].severidad_label, "Baja");
        assert_eq!(view.markers[0].municipio, "Municipio no especificado");
        assert_eq!(view.markers[0].estado, "Desconocido");
    }

    #[test]
    fn test_filter_and_counts() {
        let incidents = vec![
            incident(Some(7.1), Some(-73.1), Some("crítica"), Some("En Atención"), Some("BUCARAMANGA")),
            incident(Some(7.2), Some(-73.2), Some("alta"), Some("Resuelto"), Some("BUCARAMANGA")),
            incident(Some(7.3), Some(-73.3), Some("alta"), Some("En Atención"), Some("FLORIDABLANCA")),
        ];

        let view = build(&incidents, Some(Severidad::Alta));

        assert_eq!(view.total, 3);
        assert_eq!(view.mostrando, 2);
        assert_eq!(view.en_atencion, 2);
        assert_eq!(view.municipios, 2);

        let critica = view
            .por_severidad
            .iter()
            .find(|c| c.severidad == Severidad::Critica)
            .map(|c| c.total);
        assert_eq!(critica, Some(1));
    }
}
