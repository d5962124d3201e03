//! Grouped churn statistics over one or two segment dimensions
//!
//! Groups are always emitted in the declared order of each dimension, so the
//! same input produces the same axis order regardless of row order. Only
//! observed groups are reported; a two-way combination without rows is absent
//! from the cross-tab rather than reported as 0%.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::error::{ChurnError, ChurnResult};
use super::filter::SegmentFilter;
use super::record::EnrichedRecord;
use super::segments::Segment;

/// Attributes a table can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Geography,
    AgeGroup,
    Gender,
    CreditBand,
    TenureGroup,
    BalanceSegment,
    NumProducts,
    ActiveMember,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::Geography,
        Dimension::AgeGroup,
        Dimension::Gender,
        Dimension::CreditBand,
        Dimension::TenureGroup,
        Dimension::BalanceSegment,
        Dimension::NumProducts,
        Dimension::ActiveMember,
    ];

    /// Display name used in table headers.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Geography => "Geography",
            Dimension::AgeGroup => "Age Group",
            Dimension::Gender => "Gender",
            Dimension::CreditBand => "Credit Band",
            Dimension::TenureGroup => "Tenure Group",
            Dimension::BalanceSegment => "Balance Segment",
            Dimension::NumProducts => "Products Held",
            Dimension::ActiveMember => "Active Member",
        }
    }

    /// Command-line name.
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Geography => "geography",
            Dimension::AgeGroup => "age-group",
            Dimension::Gender => "gender",
            Dimension::CreditBand => "credit-band",
            Dimension::TenureGroup => "tenure-group",
            Dimension::BalanceSegment => "balance-segment",
            Dimension::NumProducts => "products",
            Dimension::ActiveMember => "active-member",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|d| d.name()).collect()
    }

    /// The record's value for this dimension, or `None` when the record has
    /// no segment (source value outside every bin).
    pub fn value_of(self, record: &EnrichedRecord) -> Option<SegmentValue> {
        let customer = &record.customer;
        match self {
            Dimension::Geography => Some(SegmentValue::of(customer.geography)),
            Dimension::AgeGroup => record.age_group.map(SegmentValue::of),
            Dimension::Gender => Some(SegmentValue::of(customer.gender)),
            Dimension::CreditBand => record.credit_band.map(SegmentValue::of),
            Dimension::TenureGroup => record.tenure_group.map(SegmentValue::of),
            Dimension::BalanceSegment => record.balance_segment.map(SegmentValue::of),
            Dimension::NumProducts => Some(SegmentValue::new(
                customer.num_products,
                customer.num_products.to_string(),
            )),
            Dimension::ActiveMember => Some(if customer.is_active_member {
                SegmentValue::new(1, "Active")
            } else {
                SegmentValue::new(0, "Inactive")
            }),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Dimension {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "geography" | "country" => Ok(Dimension::Geography),
            "agegroup" | "age" => Ok(Dimension::AgeGroup),
            "gender" => Ok(Dimension::Gender),
            "creditband" | "credit" | "creditscore" => Ok(Dimension::CreditBand),
            "tenuregroup" | "tenure" => Ok(Dimension::TenureGroup),
            "balancesegment" | "balanceseg" | "balance" => Ok(Dimension::BalanceSegment),
            "products" | "productsheld" | "numofproducts" | "numproducts" => {
                Ok(Dimension::NumProducts)
            }
            "activemember" | "isactivemember" | "active" => Ok(Dimension::ActiveMember),
            _ => Err(ChurnError::InvalidDimension(s.to_string())),
        }
    }
}

/// A group key: its position in the dimension's declared order plus its label.
///
/// Ordering compares `order` first, so labels never decide axis order.
/// Serializes as the bare label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentValue {
    order: u32,
    label: String,
}

impl SegmentValue {
    pub fn new(order: u32, label: impl Into<String>) -> Self {
        Self {
            order,
            label: label.into(),
        }
    }

    pub fn of<S: Segment>(segment: S) -> Self {
        Self::new(segment.rank() as u32, segment.label())
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for SegmentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for SegmentValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

/// Churn percentage rounded to one decimal (ties to even); 0.0 for an empty group.
pub fn churn_rate(churned: usize, customers: usize) -> f64 {
    if customers == 0 {
        return 0.0;
    }
    round1(churned as f64 / customers as f64 * 100.0)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    customers: usize,
    churned: usize,
    balance_sum: f64,
    age_sum: f64,
}

impl Tally {
    fn add(&mut self, record: &EnrichedRecord) {
        self.customers += 1;
        if record.exited() {
            self.churned += 1;
        }
        self.balance_sum += record.customer.balance;
        self.age_sum += record.customer.age;
    }
}

/// Statistics for one group of a single-dimension aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRow {
    pub value: SegmentValue,
    pub customers: usize,
    pub churned: usize,
    /// Percentage, one decimal
    pub churn_rate: f64,
    pub avg_balance: f64,
    pub avg_age: f64,
}

impl SegmentRow {
    fn from_tally(value: SegmentValue, tally: Tally) -> Self {
        let n = tally.customers.max(1) as f64;
        Self {
            value,
            customers: tally.customers,
            churned: tally.churned,
            churn_rate: churn_rate(tally.churned, tally.customers),
            avg_balance: tally.balance_sum / n,
            avg_age: tally.age_sum / n,
        }
    }

    pub fn retained(&self) -> usize {
        self.customers - self.churned
    }
}

/// One non-empty cell of a two-way aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabCell {
    pub row: SegmentValue,
    pub column: SegmentValue,
    pub customers: usize,
    pub churned: usize,
    pub churn_rate: f64,
}

/// Two-way churn rates. Only observed combinations have a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    /// Observed row values, declared order
    pub rows: Vec<SegmentValue>,
    /// Observed column values, declared order
    pub columns: Vec<SegmentValue>,
    /// Sorted by (row, column)
    pub cells: Vec<CrossTabCell>,
}

impl CrossTab {
    pub fn cell(&self, row: &SegmentValue, column: &SegmentValue) -> Option<&CrossTabCell> {
        self.cells
            .binary_search_by(|c| (&c.row, &c.column).cmp(&(row, column)))
            .ok()
            .map(|i| &self.cells[i])
    }

    /// Churn rate for a combination looked up by labels.
    pub fn rate(&self, row_label: &str, column_label: &str) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.row.label() == row_label && c.column.label() == column_label)
            .map(|c| c.churn_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The non-empty cell with the highest churn rate (first in order on ties).
    pub fn hottest_cell(&self) -> Option<&CrossTabCell> {
        self.cells.iter().fold(None, |best: Option<&CrossTabCell>, c| match best {
            Some(b) if b.churn_rate >= c.churn_rate => Some(b),
            _ => Some(c),
        })
    }
}

/// Grouping request: one dimension, or a row × column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    One(Dimension),
    Two(Dimension, Dimension),
}

/// Result of [`aggregate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentStats {
    OneWay {
        dimension: Dimension,
        rows: Vec<SegmentRow>,
    },
    TwoWay(CrossTab),
}

impl SegmentStats {
    pub fn is_empty(&self) -> bool {
        match self {
            SegmentStats::OneWay { rows, .. } => rows.is_empty(),
            SegmentStats::TwoWay(tab) => tab.is_empty(),
        }
    }
}

/// Filter `rows` with `predicate`, then group by the selected dimension(s).
///
/// An empty result is not an error; it yields empty stats.
pub fn aggregate(
    rows: &[&EnrichedRecord],
    predicate: &SegmentFilter,
    selection: Selection,
) -> ChurnResult<SegmentStats> {
    let filtered = predicate.apply(rows);

    match selection {
        Selection::One(dimension) => Ok(SegmentStats::OneWay {
            dimension,
            rows: aggregate_one(&filtered, dimension),
        }),
        Selection::Two(row_dim, column_dim) => {
            aggregate_two(&filtered, row_dim, column_dim).map(SegmentStats::TwoWay)
        }
    }
}

/// Customers, churned count and churn rate per value of `dimension`.
///
/// Rows without a value for the dimension are left out.
pub fn aggregate_one(rows: &[&EnrichedRecord], dimension: Dimension) -> Vec<SegmentRow> {
    let mut groups: BTreeMap<SegmentValue, Tally> = BTreeMap::new();

    for record in rows {
        if let Some(value) = dimension.value_of(record) {
            groups.entry(value).or_default().add(record);
        }
    }

    groups
        .into_iter()
        .map(|(value, tally)| SegmentRow::from_tally(value, tally))
        .collect()
}

/// Churn rate per observed (`row_dim`, `column_dim`) combination.
pub fn aggregate_two(
    rows: &[&EnrichedRecord],
    row_dim: Dimension,
    column_dim: Dimension,
) -> ChurnResult<CrossTab> {
    if row_dim == column_dim {
        return Err(ChurnError::IdenticalDimensions(row_dim));
    }

    let mut groups: BTreeMap<(SegmentValue, SegmentValue), Tally> = BTreeMap::new();

    for record in rows {
        if let (Some(r), Some(c)) = (row_dim.value_of(record), column_dim.value_of(record)) {
            groups.entry((r, c)).or_default().add(record);
        }
    }

    let mut row_values: Vec<SegmentValue> = groups.keys().map(|(r, _)| r.clone()).collect();
    row_values.dedup();
    let mut column_values: Vec<SegmentValue> = groups.keys().map(|(_, c)| c.clone()).collect();
    column_values.sort();
    column_values.dedup();

    let cells = groups
        .into_iter()
        .map(|((row, column), tally)| CrossTabCell {
            row,
            column,
            customers: tally.customers,
            churned: tally.churned,
            churn_rate: churn_rate(tally.churned, tally.customers),
        })
        .collect();

    Ok(CrossTab {
        row_dimension: row_dim,
        column_dimension: column_dim,
        rows: row_values,
        columns: column_values,
        cells,
    })
}
