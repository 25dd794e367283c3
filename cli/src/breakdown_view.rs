use crate::global_settings::GlobalSettings;
use crate::tables::{Align, Column, Table, Truncate, Width};
use itertools::Itertools;
use rust_decimal::Decimal;
use tally_lib::breakdown::{Breakdown, BreakdownRow};
use tally_lib::categories::{CategoryId, CategoryTree};
use tally_lib::reports::{Totals, Unknowns};

fn rows_table(
    title: &str,
    rows: &[BreakdownRow],
    settings: &GlobalSettings,
    width: usize,
) -> String {
    let name_image = |row: &BreakdownRow, _: &()| row.name.clone();
    let value_image =
        |row: &BreakdownRow, _: &()| settings.format.display(row.value);
    let percent_image =
        |row: &BreakdownRow, _: &()| settings.format.display_percent(row.percent);
    let columns = vec![
        Column::new((), &name_image)
            .with_title("Category")
            .with_width(Width::ExpandWithMin(10))
            .with_truncate(Truncate::Left),
        Column::new((), &value_image)
            .with_title("Amount")
            .with_align(Align::Right),
        Column::new((), &percent_image)
            .with_title("%")
            .with_align(Align::Right),
    ];
    let mut table = Table::new(columns, &settings.table)
        .with_title(title)
        .with_col_headers();
    for row in rows {
        table.add_row(row, 0);
    }
    table.add_footer(&BreakdownRow {
        category: CategoryId::UNKNOWN,
        name: "Total".into(),
        value: rows.iter().map(|r| r.value).sum(),
        percent: None,
    });
    table.to_string(width)
}

pub fn breakdown_view(
    breakdown: &Breakdown,
    categories: &CategoryTree,
    settings: &GlobalSettings,
    width: usize,
) -> String {
    let income = breakdown.income_rows(categories);
    let spending = breakdown.spending_rows(categories);
    format!(
        "{}\n{}",
        rows_table(
            &format!("Income ({})", settings.range),
            &income,
            settings,
            width
        ),
        rows_table(
            &format!("Spending ({})", settings.range),
            &spending,
            settings,
            width
        ),
    )
}

pub fn net_view(totals: &Totals, settings: &GlobalSettings) -> String {
    let savings_rate = (totals.net() * Decimal::ONE_HUNDRED)
        .checked_div(totals.income);
    format!(
        "
Period:       {}
Income:       {}
Spending:     {}
Net:          {}
Savings rate: {}
",
        settings.range,
        settings.format.display(totals.income),
        settings.format.display(totals.spending),
        settings.format.display(totals.net()),
        settings.format.display_percent(savings_rate),
    )
}

pub fn unknowns_view(unknowns: &Unknowns) -> String {
    if unknowns.is_empty() {
        return "All transactions have a category\n".to_string();
    }
    let mut result = String::new();
    if !unknowns.counterparties.is_empty() {
        result.push_str("Counterparties:\n  ");
        result.push_str(&unknowns.counterparties.iter().join("\n  "));
        result.push('\n');
    }
    if !unknowns.descriptions.is_empty() {
        result.push_str("Descriptions:\n  ");
        result.push_str(&unknowns.descriptions.iter().join("\n  "));
        result.push('\n');
    }
    result
}
