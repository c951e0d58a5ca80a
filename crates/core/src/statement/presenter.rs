//! Two-column text rendering of a statement.
//!
//! The asset side and the liability side are laid out independently and
//! zipped row by row; the shorter side is padded with blank rows.

use std::fmt::{self, Write};

use rust_decimal::Decimal;

use super::types::{ASSET_SIDE, Entry, Group, LIABILITY_SIDE, Statement, TOTAL_KEY};

/// One `(label, amount)` cell pair on one side of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideCell {
    /// Indented label.
    pub label: String,
    /// Amount, `None` for headers and separators.
    pub amount: Option<Decimal>,
}

impl SideCell {
    fn header(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            amount: None,
        }
    }

    fn amount(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount: Some(amount),
        }
    }

    fn blank() -> Self {
        Self::default()
    }
}

/// A table row pairing an asset cell with a liability cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Asset side.
    pub asset: SideCell,
    /// Liability side.
    pub liability: SideCell,
}

/// The statement laid out as aligned rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    /// Rows in display order.
    pub rows: Vec<TableRow>,
}

impl TableLayout {
    /// Lays out a statement.
    #[must_use]
    pub fn from_statement(statement: &Statement) -> Self {
        let asset = side_cells(&statement.asset);
        let liability = side_cells(&statement.liability);
        let len = asset.len().max(liability.len());

        let mut asset = asset.into_iter();
        let mut liability = liability.into_iter();
        let rows = (0..len)
            .map(|_| TableRow {
                asset: asset.next().unwrap_or_default(),
                liability: liability.next().unwrap_or_default(),
            })
            .collect();

        Self { rows }
    }

    /// Renders the layout as a grid table.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TableLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = [
            ASSET_SIDE.to_string(),
            String::new(),
            LIABILITY_SIDE.to_string(),
            String::new(),
        ];
        let body: Vec<[String; 4]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.asset.label.clone(),
                    format_amount(&row.asset),
                    row.liability.label.clone(),
                    format_amount(&row.liability),
                ]
            })
            .collect();

        let mut widths = [0usize; 4];
        for cells in std::iter::once(&header).chain(body.iter()) {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_rule(f, &widths, '-')?;
        write_cells(f, &widths, &header)?;
        write_rule(f, &widths, '=')?;
        for cells in &body {
            write_cells(f, &widths, cells)?;
            write_rule(f, &widths, '-')?;
        }
        Ok(())
    }
}

/// Renders a statement as a grid table.
#[must_use]
pub fn render_table(statement: &Statement) -> String {
    TableLayout::from_statement(statement).render()
}

fn side_cells(side: &Group) -> Vec<SideCell> {
    let mut cells = vec![SideCell::header(side.name.clone())];

    for entry in &side.entries {
        match entry {
            Entry::Group(group) => {
                cells.push(SideCell::header(format!("**{} :**", group.name)));
                for child in &group.entries {
                    match child {
                        Entry::Group(sub) => {
                            cells.push(SideCell::header(format!("  {}", sub.name)));
                            cells.extend(sub.entries.iter().map(|e| {
                                SideCell::amount(format!("    {}", e.name()), e.amount())
                            }));
                            cells.push(SideCell::amount(format!("    {TOTAL_KEY}"), sub.total));
                        }
                        Entry::Item(item) => {
                            cells.push(SideCell::amount(format!("  {}", item.name), item.value));
                        }
                    }
                }
                cells.push(SideCell::amount(format!("  {TOTAL_KEY}"), group.total));
                cells.push(SideCell::blank());
            }
            Entry::Item(item) => {
                cells.push(SideCell::amount(format!("  {}", item.name), item.value));
            }
        }
    }

    cells.push(SideCell::amount(
        format!("{TOTAL_KEY} {}", side.name),
        side.total,
    ));
    cells
}

fn format_amount(cell: &SideCell) -> String {
    match cell.amount {
        Some(amount) => amount.normalize().to_string(),
        None => String::new(),
    }
}

fn write_rule(f: &mut fmt::Formatter<'_>, widths: &[usize; 4], fill: char) -> fmt::Result {
    f.write_char('+')?;
    for width in widths {
        for _ in 0..width + 2 {
            f.write_char(fill)?;
        }
        f.write_char('+')?;
    }
    f.write_char('\n')
}

fn write_cells(
    f: &mut fmt::Formatter<'_>,
    widths: &[usize; 4],
    cells: &[String; 4],
) -> fmt::Result {
    f.write_char('|')?;
    for (idx, (width, cell)) in widths.iter().zip(cells).enumerate() {
        let pad = width - cell.chars().count();
        // Amount columns are right-aligned.
        if idx % 2 == 1 {
            write!(f, " {}{cell} |", " ".repeat(pad))?;
        } else {
            write!(f, " {cell}{} |", " ".repeat(pad))?;
        }
    }
    f.write_char('\n')
}
