use crate::error::Result;
use crate::fmt::signed_money;
use crate::view::{escape_terminal, submit, FormInput};

use super::{open_ledger, print_totals_on_change};

pub fn run(description: &str, amount: &str, kind: &str) -> Result<()> {
    let input = FormInput::new(description, amount, kind);
    // Reject bad input before touching storage.
    input.parse()?;

    let mut ledger = open_ledger()?;
    print_totals_on_change(&mut ledger);
    let txn = submit(&mut ledger, &input)?;
    println!(
        "Added #{}: {} {}",
        txn.id,
        escape_terminal(&txn.description),
        signed_money(txn.amount, txn.kind)
    );
    Ok(())
}
