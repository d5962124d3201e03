//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::pipeline::{ChurnResult, Dimension, LoadOptions, SegmentFilter};
use crate::report::Page;

/// churnlens - Customer segmentation and churn pattern analytics for retail banking data
#[derive(Parser, Debug)]
#[command(name = "churnlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV or Parquet)
    #[arg(short, long, required = true)]
    pub input: PathBuf,

    /// Keep only these countries (comma-separated, e.g. "France,Spain").
    /// Omit to include every country.
    #[arg(long, value_delimiter = ',')]
    pub country: Vec<String>,

    /// Keep only these genders (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub gender: Vec<String>,

    /// Keep only these age groups (comma-separated labels or slugs:
    /// under-30, 30-45, 46-60, over-60)
    #[arg(long, value_delimiter = ',')]
    pub age_group: Vec<String>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Write the rendered page as JSON to this path
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Headline KPIs with churn by country, age group and products held
    Overview,

    /// Churn and customer profile by country, with a country × age group grid
    Geography,

    /// Churn by age group, gender and activity status
    Demographics,

    /// Churn by products, balance and credit band plus high-value customer risk
    Financial,

    /// Compare any two dimensions
    Explore {
        /// Dimension for the one-way table and the grid rows
        #[arg(long, default_value = "geography", value_parser = parse_dimension)]
        primary: Dimension,

        /// Dimension for the grid columns
        #[arg(long, default_value = "age-group", value_parser = parse_dimension)]
        secondary: Dimension,
    },

    /// Write the dataset with its segment columns to CSV or Parquet
    Enrich {
        /// Output file path (defaults to input directory with '_enriched' suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// The report page this command renders, if it renders one.
    pub fn page(&self) -> Option<Page> {
        match self {
            Commands::Overview => Some(Page::Overview),
            Commands::Geography => Some(Page::Geography),
            Commands::Demographics => Some(Page::Demographics),
            Commands::Financial => Some(Page::Financial),
            Commands::Explore { primary, secondary } => Some(Page::Explorer {
                primary: *primary,
                secondary: *secondary,
            }),
            Commands::Enrich { .. } => None,
        }
    }
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            infer_schema_length: self.infer_schema_length,
        }
    }

    /// Build the row filter from the country, gender and age group flags.
    pub fn filter(&self) -> ChurnResult<SegmentFilter> {
        SegmentFilter::from_labels(&self.country, &self.gender, &self.age_group)
    }
}

/// Derive the enriched output path: same directory and extension as the
/// input with an `_enriched` suffix (e.g. `bank.csv` → `bank_enriched.csv`).
pub fn enriched_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv");
    parent.join(format!("{}_enriched.{}", stem, extension))
}

/// Value parser for dimension flags
fn parse_dimension(s: &str) -> Result<Dimension, String> {
    s.parse::<Dimension>().map_err(|e| e.to_string())
}
