//! Report pages built from a filtered view
//!
//! Each page is a pure function of the filtered rows: it runs the aggregator
//! and metrics and collects titled sections. Rendering and export consume the
//! resulting [`PageReport`].

use serde::Serialize;

use crate::pipeline::{
    aggregate_one, aggregate_two, churn_summary, high_value_comparison, highest_churn_segment,
    ChurnError, ChurnResult, ChurnSummary, CrossTab, Dimension, EnrichedRecord,
    HighValueComparison, SegmentRow, HIGH_VALUE_QUANTILE,
};

/// Default explorer axes
pub const DEFAULT_PRIMARY: Dimension = Dimension::Geography;
pub const DEFAULT_SECONDARY: Dimension = Dimension::AgeGroup;

/// The themed report pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Page {
    Overview,
    Geography,
    Demographics,
    Financial,
    Explorer {
        primary: Dimension,
        secondary: Dimension,
    },
}

impl Page {
    /// Pages in navigation order, with the explorer on its default axes.
    pub const MENU: [Page; 5] = [
        Page::Overview,
        Page::Geography,
        Page::Demographics,
        Page::Financial,
        Page::Explorer {
            primary: DEFAULT_PRIMARY,
            secondary: DEFAULT_SECONDARY,
        },
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Overview => "Churn Overview",
            Page::Geography => "Geographic Churn Analysis",
            Page::Demographics => "Demographic Churn Analysis",
            Page::Financial => "Financial Segmentation",
            Page::Explorer { .. } => "Segment Explorer",
        }
    }
}

/// One block of a page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    /// One-way table; `profile` adds average balance and age columns.
    Segments {
        title: String,
        dimension: Dimension,
        profile: bool,
        rows: Vec<SegmentRow>,
    },
    CrossTab {
        title: String,
        table: CrossTab,
    },
    HighValue {
        title: String,
        comparison: HighValueComparison,
    },
    /// The highest-churn group of a dimension, if any rows exist.
    Highlight {
        title: String,
        dimension: Dimension,
        segment: Option<SegmentRow>,
    },
    Note {
        title: String,
        message: String,
    },
}

/// A fully computed page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    pub page: Page,
    pub title: String,
    pub summary: ChurnSummary,
    pub sections: Vec<Section>,
}

impl PageReport {
    pub fn is_empty(&self) -> bool {
        self.summary.total == 0
    }
}

fn segments(rows: &[&EnrichedRecord], dimension: Dimension, profile: bool) -> Section {
    Section::Segments {
        title: format!("Churn by {}", dimension.label()),
        dimension,
        profile,
        rows: aggregate_one(rows, dimension),
    }
}

fn cross_tab(rows: &[&EnrichedRecord], row_dim: Dimension, column_dim: Dimension) -> ChurnResult<Section> {
    Ok(Section::CrossTab {
        title: format!("Churn Rate (%): {} × {}", row_dim.label(), column_dim.label()),
        table: aggregate_two(rows, row_dim, column_dim)?,
    })
}

/// Compute every section of `page` for the filtered `rows`.
pub fn build_page(page: Page, rows: &[&EnrichedRecord]) -> ChurnResult<PageReport> {
    let sections = match page {
        Page::Overview => vec![
            segments(rows, Dimension::Geography, false),
            segments(rows, Dimension::AgeGroup, false),
            segments(rows, Dimension::NumProducts, false),
        ],
        Page::Geography => vec![
            segments(rows, Dimension::Geography, true),
            cross_tab(rows, Dimension::Geography, Dimension::AgeGroup)?,
        ],
        Page::Demographics => vec![
            segments(rows, Dimension::AgeGroup, false),
            segments(rows, Dimension::Gender, false),
            segments(rows, Dimension::ActiveMember, false),
            cross_tab(rows, Dimension::Geography, Dimension::Gender)?,
        ],
        Page::Financial => vec![
            segments(rows, Dimension::NumProducts, false),
            segments(rows, Dimension::BalanceSegment, false),
            segments(rows, Dimension::CreditBand, false),
            Section::HighValue {
                title: "High-Value Customer Churn (Top 25% by Balance)".to_string(),
                comparison: high_value_comparison(rows, HIGH_VALUE_QUANTILE)?,
            },
        ],
        Page::Explorer { primary, secondary } => explorer_sections(rows, primary, secondary)?,
    };

    Ok(PageReport {
        page,
        title: page.title().to_string(),
        summary: churn_summary(rows),
        sections,
    })
}

fn explorer_sections(
    rows: &[&EnrichedRecord],
    primary: Dimension,
    secondary: Dimension,
) -> ChurnResult<Vec<Section>> {
    let primary_rows = aggregate_one(rows, primary);
    let highest = highest_churn_segment(&primary_rows).cloned();

    let pair = match cross_tab(rows, primary, secondary) {
        Ok(section) => section,
        Err(ChurnError::IdenticalDimensions(_)) => Section::Note {
            title: format!("{} × {}", primary.label(), secondary.label()),
            message: "Select two different dimensions to view the cross-tab.".to_string(),
        },
        Err(other) => return Err(other),
    };

    Ok(vec![
        Section::Segments {
            title: format!("Churn by {}", primary.label()),
            dimension: primary,
            profile: false,
            rows: primary_rows,
        },
        pair,
        Section::Highlight {
            title: format!("Highest churn {}", primary.label()),
            dimension: primary,
            segment: highest,
        },
    ])
}
