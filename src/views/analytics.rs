//! Analytics tab: trend chart, municipality bars, model metrics.

use serde::Serialize;

use crate::aggregation::{PeriodTotals, aggregate_trend};
use crate::client::{ApiClient, MunicipioCount};

use super::{ViewError, push_failure};

/// Bars shown in the municipality distribution chart.
const DISTRIBUTION_BARS: usize = 4;

/// Render model for the analytics view.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsView {
    /// Aggregated actual-vs-predicted series, one point per month, most
    /// recent twelve periods.
    pub tendencia: Vec<PeriodTotals>,

    /// Top municipalities for the bar chart.
    pub municipios: Vec<MunicipioCount>,

    pub roc_auc: f64,
    pub pr_auc: f64,
}

/// Load the analytics view.
///
/// The three fetches run concurrently and all settle before anything
/// renders; a single failure yields the view's error state instead of a
/// partially-populated chart.
pub async fn load_analytics(client: &ApiClient) -> Result<AnalyticsView, ViewError> {
    let (trend, municipios, metrics) = tokio::join!(
        client.prediction_trend(),
        client.municipios_distribution(),
        client.metrics(),
    );

    match (trend, municipios, metrics) {
        (Ok(trend), Ok(mut municipios), Ok(metrics)) => {
            municipios.truncate(DISTRIBUTION_BARS);
            Ok(AnalyticsView {
                tendencia: aggregate_trend(&trend),
                municipios,
                roc_auc: metrics.roc_auc,
                pr_auc: metrics.pr_auc,
            })
        }
        (trend, municipios, metrics) => {
            let mut failures = Vec::new();
            push_failure("/analytics/prediction/trend", trend, &mut failures);
            push_failure("/analytics/distribution/municipios", municipios, &mut failures);
            push_failure("/analytics/metrics", metrics, &mut failures);
            Err(ViewError::new(failures))
        }
    }
}
