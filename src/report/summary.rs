//! Headline KPI table for a filtered view

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::ChurnSummary;
use crate::utils::format_thousands;

/// Build the KPI table: totals, churned, retained and overall rate.
pub fn summary_table(summary: &ChurnSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec![
        Cell::new("👥 Total Customers"),
        Cell::new(format_thousands(summary.total as f64)),
    ]);

    table.add_row(vec![
        Cell::new("🚪 Churned Customers"),
        Cell::new(format_thousands(summary.churned as f64)).fg(if summary.churned == 0 {
            Color::White
        } else {
            Color::Red
        }),
    ]);

    table.add_row(vec![
        Cell::new("🤝 Retained Customers"),
        Cell::new(format_thousands(summary.retained as f64)).fg(Color::Green),
    ]);

    let color = if summary.churn_rate > 30.0 {
        Color::Red
    } else if summary.churn_rate > 15.0 {
        Color::Yellow
    } else {
        Color::Green
    };

    table.add_row(vec![
        Cell::new("📉 Overall Churn Rate"),
        Cell::new(format!("{:.1}%", summary.churn_rate))
            .fg(color)
            .add_attribute(Attribute::Bold),
    ]);

    table
}

pub fn display_summary(summary: &ChurnSummary) {
    println!();
    println!(
        "    {} {}",
        style("📋").cyan(),
        style("CHURN SUMMARY").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    // Indent the table
    for line in summary_table(summary).to_string().lines() {
        println!("    {}", line);
    }
}
