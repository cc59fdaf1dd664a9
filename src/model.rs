//! Presentation-tier classification and navigation.
//!
//! Severity and status arrive as free text from the upstream; the dashboard
//! maps them onto fixed tiers that pick the icon, color, and grouping
//! bucket. Both mappings are static tables and total: anything
//! unrecognized or absent falls into the lowest tier instead of erroring.

use serde::{Deserialize, Serialize};

/// Incident severity tier.
///
/// Ordered from least to most severe so tiers compare naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severidad {
    Baja,
    Media,
    Alta,
    Critica,
}

impl Severidad {
    /// Display order for filters and legends, most severe first.
    pub const ALL: [Severidad; 4] = [
        Severidad::Critica,
        Severidad::Alta,
        Severidad::Media,
        Severidad::Baja,
    ];

    /// Classify a free-text severity.
    ///
    /// Case-insensitive and tolerant of the accented and unaccented
    /// spellings of "crítica". Total: unknown or absent input maps to
    /// `Baja`.
    pub fn classify(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()) {
            Some(s) if s == "crítica" || s == "critica" => Severidad::Critica,
            Some(s) if s == "alta" => Severidad::Alta,
            Some(s) if s == "media" => Severidad::Media,
            _ => Severidad::Baja,
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severidad::Critica => "Crítica",
            Severidad::Alta => "Alta",
            Severidad::Media => "Media",
            Severidad::Baja => "Baja",
        }
    }

    /// Marker/badge color for this tier.
    pub fn color(&self) -> &'static str {
        match self {
            Severidad::Critica => "#dc2626",
            Severidad::Alta => "#ea580c",
            Severidad::Media => "#f59e0b",
            Severidad::Baja => "#16a34a",
        }
    }

    /// Marker/badge background color for this tier.
    pub fn bg_color(&self) -> &'static str {
        match self {
            Severidad::Critica => "#fee2e2",
            Severidad::Alta => "#ffedd5",
            Severidad::Media => "#fef3c7",
            Severidad::Baja => "#dcfce7",
        }
    }
}

/// Incident handling status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Estado {
    Reportado,
    EnAtencion,
    Resuelto,
    Desconocido,
}

impl Estado {
    /// Classify a free-text status.
    ///
    /// The upstream sends display-cased values ("En Atención"); matching is
    /// case-insensitive and accent-tolerant. Unknown or absent input maps
    /// to `Desconocido`.
    pub fn classify(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()) {
            Some(s) if s == "reportado" => Estado::Reportado,
            Some(s) if s == "en atención" || s == "en atencion" => Estado::EnAtencion,
            Some(s) if s == "resuelto" => Estado::Resuelto,
            _ => Estado::Desconocido,
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Estado::Reportado => "Reportado",
            Estado::EnAtencion => "En Atención",
            Estado::Resuelto => "Resuelto",
            Estado::Desconocido => "Desconocido",
        }
    }
}

/// Human-readable label for an incident type code.
///
/// Codes without an entry pass through unchanged.
pub fn tipo_label(tipo: &str) -> &str {
    match tipo {
        "violencia_intrafamiliar" => "Violencia intrafamiliar",
        "hurto_personas" => "Hurto a personas",
        "accidente_transito" => "Accidente de tránsito",
        "hurto_comercio" => "Hurto a comercio",
        "riña" => "Riña",
        "hurto_residencia" => "Hurto a residencia",
        "atraco" => "Atraco",
        "vandalismo" => "Vandalismo",
        other => other,
    }
}

/// Sidebar navigation tabs.
///
/// The active tab is the only navigation state the dashboard has; there is
/// no history behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Map,
    Analysis,
    Chat,
    Alerts,
}

impl Tab {
    /// Sidebar order.
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Map,
        Tab::Analysis,
        Tab::Chat,
        Tab::Alerts,
    ];

    /// Parse a navigation identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "dashboard" => Some(Tab::Dashboard),
            "map" => Some(Tab::Map),
            "analysis" => Some(Tab::Analysis),
            "chat" => Some(Tab::Chat),
            "alerts" => Some(Tab::Alerts),
            _ => None,
        }
    }

    /// The navigation identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Map => "map",
            Tab::Analysis => "analysis",
            Tab::Chat => "chat",
            Tab::Alerts => "alerts",
        }
    }

    /// Sidebar label.
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Map => "Mapa Interactivo",
            Tab::Analysis => "Análisis",
            Tab::Chat => "Chat",
            Tab::Alerts => "Incidentes",
        }
    }
}
