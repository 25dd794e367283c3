use crate::global_settings::GlobalSettings;
use crate::tables::{Align, Column, ColumnFooter, Table, Truncate, Width};
use anyhow::Result;
use rust_decimal::Decimal;
use tally_lib::accounts::Account;
use tally_lib::categories::CategoryTree;
use tally_lib::sessions::Session;
use tally_lib::transactions::Transaction;

// Dates are always shown as YYYY-MM-DD
const DATE_WIDTH: usize = 10;

struct AccountRow<'a> {
    name: &'a str,
    count: usize,
    first: String,
    last: String,
    balance: Option<Decimal>,
}

pub fn accounts_view(
    session: &Session,
    settings: &GlobalSettings,
    width: usize,
) -> Result<String> {
    let mut rows = Vec::new();
    for acc in session.list_accounts() {
        let txs = acc.get_transactions(&tally_lib::times::DateRange::all())?;
        rows.push(AccountRow {
            name: &acc.name,
            count: acc.len(),
            first: txs.first().map(|tx| tx.date.to_string()).unwrap_or_default(),
            last: txs.last().map(|tx| tx.date.to_string()).unwrap_or_default(),
            balance: txs.last().map(|tx| tx.running_balance),
        });
    }
    let total = AccountRow {
        name: "Total",
        count: rows.iter().map(|r| r.count).sum(),
        first: String::new(),
        last: String::new(),
        balance: Some(rows.iter().filter_map(|r| r.balance).sum()),
    };

    let name_image = |row: &AccountRow, _: &()| row.name.to_string();
    let count_image = |row: &AccountRow, _: &()| row.count.to_string();
    let first_image = |row: &AccountRow, _: &()| row.first.clone();
    let last_image = |row: &AccountRow, _: &()| row.last.clone();
    let balance_image = |row: &AccountRow, _: &()| {
        row.balance.map(|b| settings.format.display(b)).unwrap_or_default()
    };
    let columns = vec![
        Column::new((), &name_image)
            .with_title("Account")
            .with_width(Width::ExpandWithMin(8)),
        Column::new((), &count_image)
            .with_title("Count")
            .with_align(Align::Right),
        Column::new((), &first_image)
            .with_title("Since")
            .with_width(Width::Fixed(DATE_WIDTH)),
        Column::new((), &last_image)
            .with_title("Until")
            .with_width(Width::Fixed(DATE_WIDTH)),
        Column::new((), &balance_image)
            .with_title("Balance")
            .with_align(Align::Right),
    ];
    let mut table = Table::new(columns, &settings.table).with_col_headers();
    for row in &rows {
        table.add_row(row, 0);
    }
    table.add_footer(&total);
    Ok(table.to_string(width))
}

/// Show the ledger of one account, restricted to the selected range.
/// Transactions are numbered by their position in the full ledger, which is
/// what `override` expects.
pub fn transactions_view(
    account: &Account,
    categories: &CategoryTree,
    settings: &GlobalSettings,
    width: usize,
) -> Result<String> {
    type Row<'a> = (usize, &'a Transaction);

    let rows: Vec<Row> = account
        .get_transactions(&tally_lib::times::DateRange::all())?
        .into_iter()
        .enumerate()
        .filter(|(_, tx)| settings.range.contains(tx.date))
        .collect();

    let index_image = |row: &Row, _: &()| row.0.to_string();
    let date_image = |row: &Row, _: &()| row.1.date.to_string();
    let descr_image = |row: &Row, _: &()| row.1.description.clone();
    let cp_image =
        |row: &Row, _: &()| row.1.counterparty.clone().unwrap_or_default();
    let category_image = |row: &Row, _: &()| {
        let name = categories.full_name(row.1.get_category(categories));
        if row.1.category_override().is_some() {
            format!("{name} *")
        } else {
            name
        }
    };
    let amount_image = |row: &Row, _: &()| settings.format.display(row.1.amount);
    let balance_image =
        |row: &Row, _: &()| settings.format.display(row.1.running_balance);

    let columns = vec![
        Column::new((), &index_image)
            .with_title("#")
            .with_align(Align::Right),
        Column::new((), &date_image)
            .with_title("Date")
            .with_width(Width::Fixed(DATE_WIDTH)),
        Column::new((), &descr_image)
            .with_title("Description")
            .with_width(Width::ExpandWithMin(10)),
        Column::new((), &cp_image)
            .with_title("Counterparty")
            .with_width(Width::ExpandWithMin(6)),
        Column::new((), &category_image)
            .with_title("Category")
            .with_width(Width::ExpandWithMin(8))
            .with_truncate(Truncate::Left),
        Column::new((), &amount_image)
            .with_title("Amount")
            .with_align(Align::Right)
            .with_footer(ColumnFooter::Hide),
        Column::new((), &balance_image)
            .with_title("Balance")
            .with_align(Align::Right),
    ];
    let mut table = Table::new(columns, &settings.table)
        .with_title(&format!("{} ({})", account.name, settings.range))
        .with_col_headers();
    for row in &rows {
        table.add_row(row, 0);
    }
    Ok(table.to_string(width))
}

pub fn history_view(
    account: &Account,
    settings: &GlobalSettings,
    width: usize,
) -> Result<String> {
    type Row = (chrono::NaiveDate, Decimal);

    let date_image = |row: &Row, _: &()| row.0.to_string();
    let balance_image = |row: &Row, _: &()| settings.format.display(row.1);
    let columns = vec![
        Column::new((), &date_image)
            .with_title("Date")
            .with_width(Width::Fixed(DATE_WIDTH)),
        Column::new((), &balance_image)
            .with_title("Balance")
            .with_align(Align::Right),
    ];
    let mut table = Table::new(columns, &settings.table).with_col_headers();

    // Only keep the last balance of each day
    let history = account.balance_history()?;
    let mut iter = history
        .iter()
        .filter(|(date, _)| settings.range.contains(*date))
        .peekable();
    while let Some(point) = iter.next() {
        if iter.peek().is_none_or(|next| next.0 != point.0) {
            table.add_row(point, 0);
        }
    }
    Ok(table.to_string(width))
}
