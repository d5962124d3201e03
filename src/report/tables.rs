//! Terminal rendering of report pages with comfy-table

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{CrossTab, Dimension, HighValueComparison, SegmentRow};
use crate::utils::{format_currency, format_thousands};

use super::pages::{PageReport, Section};
use super::summary::display_summary;

/// Placeholder shown when the filters leave no rows
pub const EMPTY_VIEW_MESSAGE: &str = "No customers match the current filters.";

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table
}

fn header(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn number(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

/// Heat colour for a churn percentage: red from 50%, yellow from 25%.
fn rate_color(rate: f64) -> Color {
    if rate >= 50.0 {
        Color::Red
    } else if rate >= 25.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// One-way segment table; the highest churn rate is highlighted.
pub fn segment_table(dimension: Dimension, rows: &[SegmentRow], profile: bool) -> Table {
    let mut table = new_table();

    let mut headers = vec![
        header(dimension.label()),
        header("Customers"),
        header("Churned"),
        header("Retained"),
        header("Churn Rate (%)"),
    ];
    if profile {
        headers.push(header("Avg Balance"));
        headers.push(header("Avg Age"));
    }
    table.set_header(headers);

    let max_rate = rows.iter().map(|r| r.churn_rate).fold(f64::NEG_INFINITY, f64::max);

    for row in rows {
        let mut rate = number(format!("{:.1}", row.churn_rate));
        if row.churn_rate == max_rate && rows.len() > 1 {
            rate = rate.fg(Color::Red).add_attribute(Attribute::Bold);
        }

        let mut cells = vec![
            Cell::new(row.value.label()),
            number(format_thousands(row.customers as f64)),
            number(format_thousands(row.churned as f64)),
            number(format_thousands(row.retained() as f64)),
            rate,
        ];
        if profile {
            cells.push(number(format_currency(row.avg_balance)));
            cells.push(number(format!("{:.1}", row.avg_age)));
        }
        table.add_row(cells);
    }

    table
}

/// Two-way churn-rate grid. Absent combinations are shown as `—`.
pub fn cross_tab_table(tab: &CrossTab) -> Table {
    let mut table = new_table();

    let mut headers = vec![header(&format!(
        "{} \\ {}",
        tab.row_dimension.label(),
        tab.column_dimension.label()
    ))];
    headers.extend(tab.columns.iter().map(|c| header(c.label())));
    table.set_header(headers);

    for row in &tab.rows {
        let mut cells = vec![Cell::new(row.label()).add_attribute(Attribute::Bold)];
        for column in &tab.columns {
            cells.push(match tab.cell(row, column) {
                Some(cell) => number(format!("{:.1}", cell.churn_rate)).fg(rate_color(cell.churn_rate)),
                None => Cell::new("—").set_alignment(CellAlignment::Center).fg(Color::DarkGrey),
            });
        }
        table.add_row(cells);
    }

    table
}

pub fn high_value_table(comparison: &HighValueComparison) -> Table {
    let mut table = new_table();
    table.set_header(vec![header("Group"), header("Churn Rate (%)")]);
    table.add_row(vec![
        Cell::new("All Customers"),
        number(format!("{:.1}", comparison.overall_churn_rate)),
    ]);
    table.add_row(vec![
        Cell::new(format!(
            "High-Value (Top {:.0}%)",
            (1.0 - comparison.quantile) * 100.0
        )),
        number(format!("{:.1}", comparison.high_value_churn_rate))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    ]);
    table
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn print_section_title(title: &str) {
    println!();
    println!("    {} {}", style("▸").cyan(), style(title).white().bold());
}

pub fn display_section(section: &Section) {
    match section {
        Section::Segments {
            title,
            dimension,
            profile,
            rows,
        } => {
            print_section_title(title);
            if rows.is_empty() {
                println!("      {}", style(EMPTY_VIEW_MESSAGE).dim());
            } else {
                print_indented(&segment_table(*dimension, rows, *profile));
            }
        }
        Section::CrossTab { title, table } => {
            print_section_title(title);
            if table.is_empty() {
                println!("      {}", style(EMPTY_VIEW_MESSAGE).dim());
            } else {
                print_indented(&cross_tab_table(table));
                if let Some(hot) = table.hottest_cell() {
                    println!(
                        "      Highest: {} × {} at {}",
                        style(hot.row.label()).bold(),
                        style(hot.column.label()).bold(),
                        style(format!("{:.1}%", hot.churn_rate)).red().bold()
                    );
                }
            }
        }
        Section::HighValue { title, comparison } => {
            print_section_title(title);
            match comparison.threshold {
                Some(threshold) => {
                    print_indented(&high_value_table(comparison));
                    println!(
                        "      Balance threshold: {}   Customers: {}",
                        style(format_currency(threshold)).yellow(),
                        style(comparison.high_value_customers).yellow()
                    );
                    println!(
                        "      Assets lost with churned high-value customers: {}",
                        style(format_currency(comparison.assets_lost)).red().bold()
                    );
                }
                None => println!("      {}", style(EMPTY_VIEW_MESSAGE).dim()),
            }
        }
        Section::Highlight {
            title, segment, ..
        } => {
            print_section_title(title);
            match segment {
                Some(row) => println!(
                    "      {} — {}",
                    style(row.value.label()).bold(),
                    style(format!("{:.1}%", row.churn_rate)).red().bold()
                ),
                None => println!("      {}", style(EMPTY_VIEW_MESSAGE).dim()),
            }
        }
        Section::Note { title, message } => {
            print_section_title(title);
            println!("      {}", style(message).yellow());
        }
    }
}

/// Print a whole page: headline KPIs followed by every section.
pub fn display_page(report: &PageReport) {
    println!();
    println!(
        "    {} {}",
        style("◆").cyan().bold(),
        style(&report.title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());

    if report.is_empty() {
        println!();
        println!("    {}", style(EMPTY_VIEW_MESSAGE).yellow());
        return;
    }

    display_summary(&report.summary);

    for section in &report.sections {
        display_section(section);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{aggregate_one, aggregate_two, CustomerRecord, EnrichedTable, Gender, Geography};

    fn table() -> EnrichedTable {
        EnrichedTable::from_customers((0..6).map(|i| CustomerRecord {
            customer_id: i,
            credit_score: 580.0,
            geography: if i < 3 { Geography::France } else { Geography::Germany },
            gender: if i % 2 == 0 { Gender::Female } else { Gender::Male },
            age: 28.0,
            tenure: 1.0,
            balance: 12_500.0,
            num_products: 2,
            has_credit_card: false,
            is_active_member: true,
            estimated_salary: 30_000.0,
            exited: i >= 4,
        }))
    }

    #[test]
    fn test_segment_table_contents() {
        let t = table();
        let rows = aggregate_one(&t.view(), Dimension::Geography);
        let rendered = segment_table(Dimension::Geography, &rows, true).to_string();

        assert!(rendered.contains("Geography"));
        assert!(rendered.contains("France"));
        assert!(rendered.contains("66.7"));
        assert!(rendered.contains("Avg Balance"));
    }

    #[test]
    fn test_cross_tab_marks_absent_cells() {
        let t = table();
        let tab = aggregate_two(&t.view(), Dimension::AgeGroup, Dimension::Geography).unwrap();
        let rendered = cross_tab_table(&tab).to_string();
        assert!(rendered.contains("Under 30"));
        assert!(rendered.contains("Germany"));

        let tab = aggregate_two(&t.view(), Dimension::Geography, Dimension::Gender).unwrap();
        assert!(!cross_tab_table(&tab).to_string().contains("—"));

        // France has only female customers, so France × Male is empty
        let french_women = EnrichedTable::from_customers(table().records().iter().map(|r| {
            let mut customer = r.customer.clone();
            if customer.geography == Geography::France {
                customer.gender = Gender::Female;
            }
            customer
        }));
        let tab = aggregate_two(&french_women.view(), Dimension::Geography, Dimension::Gender).unwrap();
        assert_eq!(tab.rate("France", "Male"), None);

        let rendered = cross_tab_table(&tab).to_string();
        let france = rendered.lines().find(|line| line.contains("France")).unwrap();
        let germany = rendered.lines().find(|line| line.contains("Germany")).unwrap();
        assert!(france.contains("—"), "absent cell drawn as a dash: {}", france);
        assert!(!germany.contains("—"));
    }
}
