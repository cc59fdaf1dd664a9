//! Chart-side shaping of upstream series.
//!
//! The trend endpoint returns rows at whatever granularity the model was
//! evaluated on; the chart wants one point per month. Grouping and
//! truncation happen here, along with the pagination of the municipality
//! list. Everything operates on already-fetched, in-memory data.

use std::collections::HashMap;

use serde::Serialize;

use crate::client::TrendPoint;

/// Number of periods the trend chart shows.
pub const TREND_PERIODS: usize = 12;

/// Page size for the municipality list.
pub const MUNICIPIOS_PAGE_SIZE: usize = 5;

/// Totals for one "YYYY-MM" period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    pub periodo: String,
    pub reales: i64,
    pub predichos: i64,
}

/// Group trend rows by (year, month) and keep the most recent
/// [`TREND_PERIODS`] periods.
///
/// Rows sharing a period are summed into one accumulator, created on first
/// encounter. Before truncation the periods are sorted chronologically, so
/// "most recent 12" holds even when the upstream returns rows out of
/// order; the output is deterministic for any permutation of the input.
pub fn aggregate_trend(points: &[TrendPoint]) -> Vec<PeriodTotals> {
    let mut order: Vec<(i32, u32)> = Vec::new();
    let mut totals: HashMap<(i32, u32), (i64, i64)> = HashMap::new();

    for point in points {
        let key = (point.anio, point.mes);
        let entry = totals.entry(key).or_insert_with(|| {
            order.push(key);
            (0, 0)
        });
        entry.0 += point.reales;
        entry.1 += point.predichos;
    }

    order.sort_unstable();

    let skip = order.len().saturating_sub(TREND_PERIODS);
    order
        .into_iter()
        .skip(skip)
        .map(|(anio, mes)| {
            let (reales, predichos) = totals[&(anio, mes)];
            PeriodTotals {
                periodo: format!("{anio}-{mes:02}"),
                reales,
                predichos,
            }
        })
        .collect()
}

/// Fixed-size pagination over an already-fetched list.
///
/// The requested page is clamped into `[0, page_count - 1]`, so "previous"
/// at the first page stays put and "next" at the last page stays put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pager {
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
}

impl Pager {
    /// Build a pager for `len` items, clamping `requested`.
    pub fn new(len: usize, page_size: usize, requested: usize) -> Self {
        let page_count = len.div_ceil(page_size);
        Self {
            page: requested.min(page_count.saturating_sub(1)),
            page_count,
            page_size,
        }
    }

    /// The page "previous" navigates to.
    pub fn prev(&self) -> usize {
        self.page.saturating_sub(1)
    }

    /// The page "next" navigates to.
    pub fn next(&self) -> usize {
        (self.page + 1).min(self.page_count.saturating_sub(1))
    }

    /// Slice the backing list to the current page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }
}
