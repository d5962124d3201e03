//! Row filters over raw categorical attributes

use std::collections::BTreeSet;

use serde::Serialize;

use super::error::{ChurnError, ChurnResult};
use super::record::EnrichedRecord;
use super::segments::{AgeGroup, Gender, Geography, Segment};

/// Membership constraints on geography, gender and age group.
///
/// `None` leaves a column unconstrained. `Some` of an empty set matches no
/// row, and a row without an age group never satisfies an age constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SegmentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geographies: Option<BTreeSet<Geography>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genders: Option<BTreeSet<Gender>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_groups: Option<BTreeSet<AgeGroup>>,
}

impl SegmentFilter {
    /// A filter that keeps every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_geographies(mut self, values: impl IntoIterator<Item = Geography>) -> Self {
        self.geographies = Some(values.into_iter().collect());
        self
    }

    pub fn with_genders(mut self, values: impl IntoIterator<Item = Gender>) -> Self {
        self.genders = Some(values.into_iter().collect());
        self
    }

    pub fn with_age_groups(mut self, values: impl IntoIterator<Item = AgeGroup>) -> Self {
        self.age_groups = Some(values.into_iter().collect());
        self
    }

    /// Build a filter from user-supplied labels. Empty lists leave the column
    /// unconstrained, matching a multiselect with everything selected.
    pub fn from_labels(
        geographies: &[String],
        genders: &[String],
        age_groups: &[String],
    ) -> ChurnResult<Self> {
        Ok(Self {
            geographies: parse_set(geographies, "country")?,
            genders: parse_set(genders, "gender")?,
            age_groups: parse_set(age_groups, "age group")?,
        })
    }

    pub fn is_unfiltered(&self) -> bool {
        self.geographies.is_none() && self.genders.is_none() && self.age_groups.is_none()
    }

    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        let geography_ok = self
            .geographies
            .as_ref()
            .map_or(true, |set| set.contains(&record.customer.geography));
        let gender_ok = self
            .genders
            .as_ref()
            .map_or(true, |set| set.contains(&record.customer.gender));
        let age_ok = self.age_groups.as_ref().map_or(true, |set| {
            record.age_group.map_or(false, |g| set.contains(&g))
        });

        geography_ok && gender_ok && age_ok
    }

    /// Select matching rows, keeping their relative order.
    pub fn apply<'a>(&self, rows: &[&'a EnrichedRecord]) -> Vec<&'a EnrichedRecord> {
        rows.iter().copied().filter(|r| self.matches(r)).collect()
    }

    /// Short human-readable description, e.g. `Country: Germany | Gender: all`.
    pub fn describe(&self) -> String {
        format!(
            "Country: {} | Gender: {} | Age Group: {}",
            describe_set(&self.geographies),
            describe_set(&self.genders),
            describe_set(&self.age_groups)
        )
    }
}

fn parse_set<S: Segment>(values: &[String], field: &'static str) -> ChurnResult<Option<BTreeSet<S>>> {
    if values.is_empty() {
        return Ok(None);
    }

    values
        .iter()
        .map(|v| {
            S::parse_label(v).ok_or_else(|| ChurnError::InvalidFilterValue {
                field,
                value: v.clone(),
            })
        })
        .collect::<ChurnResult<BTreeSet<S>>>()
        .map(Some)
}

fn describe_set<S: Segment>(set: &Option<BTreeSet<S>>) -> String {
    match set {
        None => "all".to_string(),
        Some(s) if s.is_empty() => "none".to_string(),
        Some(s) => s.iter().map(|v| v.label()).collect::<Vec<_>>().join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::record::{CustomerRecord, EnrichedTable};

    fn table() -> EnrichedTable {
        let rows = [
            (Geography::France, Gender::Male, 25.0),
            (Geography::Germany, Gender::Female, 50.0),
            (Geography::Spain, Gender::Female, 35.0),
            (Geography::Germany, Gender::Male, 150.0),
        ];
        EnrichedTable::from_customers(rows.iter().enumerate().map(|(i, (geo, gender, age))| {
            CustomerRecord {
                customer_id: i as i64,
                credit_score: 650.0,
                geography: *geo,
                gender: *gender,
                age: *age,
                tenure: 3.0,
                balance: 0.0,
                num_products: 1,
                has_credit_card: true,
                is_active_member: false,
                estimated_salary: 50_000.0,
                exited: false,
            }
        }))
    }

    #[test]
    fn test_unfiltered_keeps_everything() {
        let table = table();
        let filter = SegmentFilter::all();
        assert!(filter.is_unfiltered());
        assert_eq!(filter.apply(&table.view()).len(), 4);
    }

    #[test]
    fn test_geography_and_gender_constraints() {
        let table = table();
        let filter = SegmentFilter::all()
            .with_geographies([Geography::Germany])
            .with_genders([Gender::Female]);
        let rows = filter.apply(&table.view());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer.customer_id, 1);
    }

    #[test]
    fn test_age_constraint_excludes_rows_without_group() {
        let table = table();
        let filter = SegmentFilter::all().with_age_groups(AgeGroup::ALL.iter().copied());
        // Row 3 is aged 150 and has no age group.
        assert_eq!(filter.apply(&table.view()).len(), 3);
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let table = table();
        let filter = SegmentFilter::all().with_genders([]);
        assert!(filter.apply(&table.view()).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let table = table();
        let filter = SegmentFilter::all().with_geographies([Geography::Germany, Geography::Spain]);
        let once = filter.apply(&table.view());
        let twice = filter.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_from_labels() {
        let filter = SegmentFilter::from_labels(
            &["germany".to_string(), "Spain".to_string()],
            &[],
            &["46-60".to_string()],
        )
        .unwrap();
        assert_eq!(filter.geographies.as_ref().map(|s| s.len()), Some(2));
        assert!(filter.genders.is_none());
        assert_eq!(
            filter.describe(),
            "Country: Germany, Spain | Gender: all | Age Group: 46–60"
        );

        let err = SegmentFilter::from_labels(&["Italy".to_string()], &[], &[]).unwrap_err();
        assert!(matches!(err, ChurnError::InvalidFilterValue { field: "country", .. }));
    }
}
