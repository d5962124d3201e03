//! churnlens: Customer Churn Analytics CLI
//!
//! Loads a retail-bank customer table, derives segment attributes and renders
//! themed churn reports in the terminal.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use churnlens::cli::{enriched_output_path, select_page, Cli, Commands};
use churnlens::pipeline::{enriched_dataframe, save_dataset, DatasetCache, EnrichedTable, SegmentFilter};
use churnlens::report::{build_page, display_page, export_page_report, ExportParams, Page};
use churnlens::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_info, print_step_header, print_step_time, print_success, print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let input = &cli.input;
    let filter = cli.filter()?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(input, &filter.describe());

    // Step 1: Load and enrich
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let mut cache = DatasetCache::new(input.clone(), cli.load_options());
    let spinner = create_spinner("Loading and enriching dataset...");
    let table = match cache.get_or_load() {
        Ok(table) => {
            finish_with_success(&spinner, "Dataset loaded");
            table
        }
        Err(e) => {
            finish_with_warning(&spinner, "Dataset could not be loaded");
            return Err(e).with_context(|| format!("Failed to load {}", input.display()));
        }
    };
    println!(
        "\n    {} Dataset Statistics:",
        style("✧").cyan()
    );
    println!("      Customers: {}", table.len());
    print_step_time(step_start.elapsed());

    match &cli.command {
        Some(Commands::Enrich { output }) => {
            let output = output.clone().unwrap_or_else(|| enriched_output_path(input));
            print_step_header(2, "Write Enriched Dataset");
            write_enriched(&table, &output)?;
        }
        Some(command) => {
            if let Some(page) = command.page() {
                print_step_header(2, page.title());
                render_page(page, &table, &filter, &cli, input)?;
            }
        }
        None => run_interactive(&mut cache, &filter, &cli, input)?,
    }

    print_completion();
    Ok(())
}

/// Page navigation loop; the cache reloads between selections if the file changed.
fn run_interactive(cache: &mut DatasetCache, filter: &SegmentFilter, cli: &Cli, input: &Path) -> Result<()> {
    let mut last: Option<Page> = None;

    while let Some(page) = select_page(last)? {
        if cache.is_stale() {
            print_info("Source file changed on disk, reloading");
        }
        let table = cache
            .get_or_load()
            .with_context(|| format!("Failed to reload {}", input.display()))?;

        render_page(page, &table, filter, cli, input)?;
        last = Some(page);
    }

    Ok(())
}

fn render_page(
    page: Page,
    table: &EnrichedTable,
    filter: &SegmentFilter,
    cli: &Cli,
    input: &Path,
) -> Result<()> {
    let view = table.view();
    let rows = filter.apply(&view);
    if !filter.is_unfiltered() {
        print_info(&format!("{} of {} customers match the filters", rows.len(), table.len()));
    }

    let report = build_page(page, &rows)?;
    display_page(&report);

    if let Some(export_path) = &cli.export {
        let input_file = input.display().to_string();
        export_page_report(
            &report,
            export_path,
            &ExportParams {
                input_file: &input_file,
                filter,
            },
        )?;
        println!();
        print_success(&format!("Report saved to {}", export_path.display()));
    }

    Ok(())
}

fn write_enriched(table: &EnrichedTable, output: &Path) -> Result<()> {
    let step_start = Instant::now();
    let spinner = create_spinner("Writing enriched dataset...");

    let mut df = enriched_dataframe(table).context("Failed to build enriched table")?;
    if let Err(e) = save_dataset(&mut df, output) {
        finish_with_warning(&spinner, "Write failed");
        return Err(e).with_context(|| format!("Failed to write {}", output.display()));
    }
    finish_with_success(&spinner, "Enriched dataset written");

    if table.records().iter().any(|r| r.age_group.is_none() || r.credit_band.is_none()) {
        print_warning("Some rows fall outside every bin; their segment cells are empty");
    }
    print_success(&format!("Saved {} rows to {}", table.len(), output.display()));
    print_step_time(step_start.elapsed());
    Ok(())
}
