//! Typed customer rows and the immutable enriched table

use serde::Serialize;

use super::segments::{AgeGroup, BalanceSegment, ChurnLabel, CreditBand, Gender, Geography, TenureGroup};

/// One bank customer as read from the source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub customer_id: i64,
    pub credit_score: f64,
    pub geography: Geography,
    pub gender: Gender,
    pub age: f64,
    pub tenure: f64,
    pub balance: f64,
    pub num_products: u32,
    pub has_credit_card: bool,
    pub is_active_member: bool,
    pub estimated_salary: f64,
    pub exited: bool,
}

/// A customer with its derived segments.
///
/// A derived field is `None` when the source value lies outside every bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub customer: CustomerRecord,
    pub age_group: Option<AgeGroup>,
    pub credit_band: Option<CreditBand>,
    pub tenure_group: Option<TenureGroup>,
    pub balance_segment: Option<BalanceSegment>,
    pub churn_label: ChurnLabel,
}

impl EnrichedRecord {
    /// Derive every segment from the raw record. No cross-row state is used.
    pub fn enrich(customer: CustomerRecord) -> Self {
        Self {
            age_group: AgeGroup::from_age(customer.age),
            credit_band: CreditBand::from_score(customer.credit_score),
            tenure_group: TenureGroup::from_tenure(customer.tenure),
            balance_segment: BalanceSegment::from_balance(customer.balance),
            churn_label: ChurnLabel::from_exited(customer.exited),
            customer,
        }
    }

    pub fn exited(&self) -> bool {
        self.customer.exited
    }

    pub fn balance(&self) -> f64 {
        self.customer.balance
    }
}

/// The enriched dataset, in source row order.
///
/// Built once per source version and never mutated; filters and aggregations
/// borrow rows through [`EnrichedTable::view`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedTable {
    records: Vec<EnrichedRecord>,
}

impl EnrichedTable {
    pub fn new(records: Vec<EnrichedRecord>) -> Self {
        Self { records }
    }

    pub fn from_customers(customers: impl IntoIterator<Item = CustomerRecord>) -> Self {
        Self::new(customers.into_iter().map(EnrichedRecord::enrich).collect())
    }

    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    /// Borrow every row, in order.
    pub fn view(&self) -> Vec<&EnrichedRecord> {
        self.records.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
