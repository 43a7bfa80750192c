use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::summary::Summary;

use super::open_ledger;

pub fn run() -> Result<()> {
    let ledger = open_ledger()?;
    let summary = Summary::of(ledger.list());

    let balance = money(summary.balance);
    let balance = if summary.is_negative() {
        balance.red().bold()
    } else {
        balance.green().bold()
    };

    let mut table = Table::new();
    table.set_header(vec!["", "Amount"]);
    table.add_row(vec![Cell::new("Total Income".green()), Cell::new(money(summary.total_income))]);
    table.add_row(vec![Cell::new("Total Expenses".red()), Cell::new(money(summary.total_expense))]);
    table.add_row(vec![Cell::new("Balance".bold()), Cell::new(balance)]);
    println!("Summary\n{table}");
    Ok(())
}
