//! Churn KPIs and high-value customer metrics

use serde::Serialize;

use super::aggregate::{round1, SegmentRow};
use super::error::{ChurnError, ChurnResult};
use super::record::EnrichedRecord;

/// Share of the top balances treated as "high value".
pub const HIGH_VALUE_QUANTILE: f64 = 0.75;

/// Headline counts for a view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnSummary {
    pub total: usize,
    pub churned: usize,
    pub retained: usize,
    /// Unrounded percentage
    pub churn_rate: f64,
}

/// Churned percentage of the view, unrounded. 0.0 for an empty view.
pub fn overall_churn_rate(rows: &[&EnrichedRecord]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let churned = rows.iter().filter(|r| r.exited()).count();
    churned as f64 / rows.len() as f64 * 100.0
}

pub fn churn_summary(rows: &[&EnrichedRecord]) -> ChurnSummary {
    let churned = rows.iter().filter(|r| r.exited()).count();
    ChurnSummary {
        total: rows.len(),
        churned,
        retained: rows.len() - churned,
        churn_rate: overall_churn_rate(rows),
    }
}

/// Balance percentile using linear interpolation between closest ranks.
///
/// With sorted balances `x` and `h = (n - 1) * q`, the result is
/// `x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`. This is
/// the "linear" method, the default of NumPy and pandas.
pub fn balance_quantile(rows: &[&EnrichedRecord], q: f64) -> ChurnResult<Option<f64>> {
    if !(0.0..=1.0).contains(&q) {
        return Err(ChurnError::InvalidQuantile(q));
    }
    if rows.is_empty() {
        return Ok(None);
    }

    let mut balances: Vec<f64> = rows.iter().map(|r| r.balance()).collect();
    balances.sort_by(|a, b| a.total_cmp(b));

    let h = (balances.len() - 1) as f64 * q;
    let lower = h.floor() as usize;
    let upper = (lower + 1).min(balances.len() - 1);
    let fraction = h - lower as f64;

    Ok(Some(
        balances[lower] + fraction * (balances[upper] - balances[lower]),
    ))
}

/// Rows whose balance is at or above the `q` balance percentile of `rows`.
pub fn high_value_subset<'a>(
    rows: &[&'a EnrichedRecord],
    q: f64,
) -> ChurnResult<Vec<&'a EnrichedRecord>> {
    Ok(match balance_quantile(rows, q)? {
        Some(threshold) => rows
            .iter()
            .copied()
            .filter(|r| r.balance() >= threshold)
            .collect(),
        None => Vec::new(),
    })
}

/// Sum of balances held by churned customers ("assets at risk").
pub fn total_balance(rows: &[&EnrichedRecord]) -> f64 {
    rows.iter()
        .filter(|r| r.exited())
        .map(|r| r.balance())
        .sum()
}

/// High-value churn compared against the whole view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighValueComparison {
    pub quantile: f64,
    /// Balance cutoff; `None` for an empty view
    pub threshold: Option<f64>,
    pub high_value_customers: usize,
    /// Percentage, one decimal
    pub overall_churn_rate: f64,
    /// Percentage, one decimal
    pub high_value_churn_rate: f64,
    /// Balance that left with churned high-value customers
    pub assets_lost: f64,
}

pub fn high_value_comparison(rows: &[&EnrichedRecord], q: f64) -> ChurnResult<HighValueComparison> {
    let threshold = balance_quantile(rows, q)?;
    let high_value = high_value_subset(rows, q)?;

    Ok(HighValueComparison {
        quantile: q,
        threshold,
        high_value_customers: high_value.len(),
        overall_churn_rate: round1(overall_churn_rate(rows)),
        high_value_churn_rate: round1(overall_churn_rate(&high_value)),
        assets_lost: total_balance(&high_value),
    })
}

/// The segment with the highest churn rate; the earliest one in declared order on ties.
pub fn highest_churn_segment(rows: &[SegmentRow]) -> Option<&SegmentRow> {
    rows.iter().fold(None, |best: Option<&SegmentRow>, row| match best {
        Some(b) if b.churn_rate >= row.churn_rate => Some(b),
        _ => Some(row),
    })
}
