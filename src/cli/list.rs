use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::signed_money;
use crate::summary::Summary;
use crate::view::{display_order, escape_terminal, format_recorded_at, render_html, EMPTY_STATE};

use super::{open_ledger, totals_line};

pub fn run(html: bool) -> Result<()> {
    let ledger = open_ledger()?;
    let summary = Summary::of(ledger.list());

    if html {
        print!("{}", render_html(ledger.list(), &summary));
        return Ok(());
    }

    if ledger.is_empty() {
        println!("{EMPTY_STATE}");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["ID", "Date", "Description", "Amount"]);
        for txn in display_order(ledger.list()) {
            let amount = signed_money(txn.amount, txn.kind);
            let amount = if txn.is_income() { amount.green() } else { amount.red() };
            table.add_row(vec![
                Cell::new(txn.id),
                Cell::new(format_recorded_at(&txn.recorded_at)),
                Cell::new(escape_terminal(&txn.description)),
                Cell::new(amount),
            ]);
        }
        println!("Transactions\n{table}");
    }
    println!("{}", totals_line(&summary));
    Ok(())
}
