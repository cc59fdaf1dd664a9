//! Per-tab view composition.
//!
//! Each view fetches what it needs from the analytics API, concurrently
//! when it needs several resources, waits for everything to settle, and
//! either renders its full model or reports a single view-level error
//! carrying every failed request. A view never renders partially: one
//! failed fetch flips the whole view to its error state even when sibling
//! requests succeeded.
//!
//! # Views
//!
//! - [`overview`]: stat cards, risk prediction, municipality distribution
//! - [`analytics`]: trend chart, distribution bars, model metrics
//! - [`map`]: classified geo markers with severity filter
//! - [`incidents`]: the recent-incidents table

pub mod analytics;
pub mod incidents;
pub mod map;
pub mod overview;

pub use analytics::{AnalyticsView, load_analytics};
pub use incidents::{IncidentRow, IncidentsView, load_incidents};
pub use map::{MapView, Marker, SeverityCount, load_map};
pub use overview::{OverviewView, RiskPanel, StatCardModel, Tono, load_overview};

use serde::Serialize;

use crate::client::ApiError;

/// One failed fetch inside a view load.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFetch {
    /// Endpoint path that failed.
    pub endpoint: &'static str,

    /// The "request failed" detail for the error panel.
    pub message: String,
}

/// Error state for a whole view.
///
/// Rendered as the centered error panel with a manual retry; retrying
/// re-runs all of the view's fetches.
#[derive(Debug, Clone, Serialize)]
pub struct ViewError {
    pub message: String,
    pub failures: Vec<FailedFetch>,
}

impl ViewError {
    pub(crate) fn new(failures: Vec<FailedFetch>) -> Self {
        Self {
            message: "Error cargando datos".to_string(),
            failures,
        }
    }

    pub(crate) fn single(endpoint: &'static str, error: ApiError) -> Self {
        Self::new(vec![FailedFetch {
            endpoint,
            message: error.to_string(),
        }])
    }
}

/// Record a settled fetch's failure, if it failed.
pub(crate) fn push_failure<T>(
    endpoint: &'static str,
    result: Result<T, ApiError>,
    failures: &mut Vec<FailedFetch>,
) {
    if let Err(error) = result {
        failures.push(FailedFetch {
            endpoint,
            message: error.to_string(),
        });
    }
}
