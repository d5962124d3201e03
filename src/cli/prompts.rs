//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Select};

use crate::pipeline::Dimension;
use crate::report::{Page, DEFAULT_PRIMARY, DEFAULT_SECONDARY};

const QUIT_LABEL: &str = "Quit";

/// Menu entries in display order; the last entry quits.
pub fn menu_items() -> Vec<&'static str> {
    Page::MENU
        .iter()
        .map(|page| page.title())
        .chain(std::iter::once(QUIT_LABEL))
        .collect()
}

/// Ask which page to show next. `None` means the analyst chose Quit.
pub fn select_page(last: Option<Page>) -> Result<Option<Page>> {
    let items = menu_items();
    let default = last
        .and_then(|page| {
            Page::MENU
                .iter()
                .position(|p| std::mem::discriminant(p) == std::mem::discriminant(&page))
        })
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a page")
        .items(&items)
        .default(default)
        .interact()?;

    match Page::MENU.get(selection) {
        Some(Page::Explorer { .. }) => {
            let (primary, secondary) = match last {
                Some(Page::Explorer { primary, secondary }) => (primary, secondary),
                _ => (DEFAULT_PRIMARY, DEFAULT_SECONDARY),
            };
            let primary = select_dimension("Primary dimension", primary)?;
            let secondary = select_dimension("Compare against", secondary)?;
            Ok(Some(Page::Explorer { primary, secondary }))
        }
        Some(page) => Ok(Some(*page)),
        None => Ok(None),
    }
}

/// Pick one grouping dimension, preselecting `current`.
pub fn select_dimension(prompt: &str, current: Dimension) -> Result<Dimension> {
    let labels: Vec<&str> = Dimension::ALL.iter().map(|d| d.label()).collect();
    let default = Dimension::ALL
        .iter()
        .position(|d| *d == current)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(Dimension::ALL.get(selection).copied().unwrap_or(current))
}
