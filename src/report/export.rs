//! JSON export of report pages

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::SegmentFilter;

use super::pages::PageReport;

/// Metadata about the run that produced the report
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    /// Timestamp of the export (RFC 3339)
    pub timestamp: String,
    pub churnlens_version: String,
    pub input_file: String,
    /// Active filters; unconstrained columns are omitted
    pub filters: SegmentFilter,
    pub filter_description: String,
}

/// Complete export: metadata plus the computed page
#[derive(Debug, Serialize)]
pub struct PageExport<'a> {
    pub metadata: ReportMetadata,
    pub report: &'a PageReport,
}

/// Parameters describing where the report came from
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub filter: &'a SegmentFilter,
}

pub fn build_export<'a>(report: &'a PageReport, params: &ExportParams) -> PageExport<'a> {
    PageExport {
        metadata: ReportMetadata {
            timestamp: Utc::now().to_rfc3339(),
            churnlens_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            filters: params.filter.clone(),
            filter_description: params.filter.describe(),
        },
        report,
    }
}

/// Write a page report with metadata as pretty-printed JSON
pub fn export_page_report(report: &PageReport, output_path: &Path, params: &ExportParams) -> Result<()> {
    let export = build_export(report, params);

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize page report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{CustomerRecord, EnrichedTable, Gender, Geography};
    use crate::report::{build_page, Page};

    #[test]
    fn test_export_structure() {
        let table = EnrichedTable::from_customers((0..4).map(|i| CustomerRecord {
            customer_id: i,
            credit_score: 720.0,
            geography: Geography::Germany,
            gender: Gender::Male,
            age: 47.0,
            tenure: 7.0,
            balance: 60_000.0,
            num_products: 3,
            has_credit_card: true,
            is_active_member: false,
            estimated_salary: 90_000.0,
            exited: i == 0,
        }));
        let report = build_page(Page::Overview, &table.view()).unwrap();
        let filter = SegmentFilter::all().with_geographies([Geography::Germany]);
        let export = build_export(
            &report,
            &ExportParams {
                input_file: "bank.csv",
                filter: &filter,
            },
        );

        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["metadata"]["input_file"], "bank.csv");
        assert_eq!(value["metadata"]["filters"]["geographies"][0], "Germany");
        assert!(value["metadata"]["filters"].get("genders").is_none());
        assert_eq!(value["report"]["page"]["name"], "overview");
        assert_eq!(value["report"]["summary"]["total"], 4);
        assert_eq!(value["report"]["sections"][0]["kind"], "segments");
        assert_eq!(value["report"]["sections"][0]["rows"][0]["value"], "Germany");
        assert_eq!(value["report"]["sections"][0]["rows"][0]["churn_rate"], 25.0);
    }
}
