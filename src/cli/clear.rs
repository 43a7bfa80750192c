use crate::error::Result;

use super::{confirm, open_ledger, open_ledger_discarding, print_totals_on_change};

pub fn run(yes: bool, force: bool) -> Result<()> {
    let mut ledger = if force {
        if !yes && !confirm("Discard the stored ledger without reading it?")? {
            println!("Cancelled.");
            return Ok(());
        }
        open_ledger_discarding()?
    } else {
        let ledger = open_ledger()?;
        if ledger.is_empty() {
            println!("No transactions to clear.");
            return Ok(());
        }
        let prompt = format!("Delete all {} transactions?", ledger.len());
        if !yes && !confirm(&prompt)? {
            println!("Cancelled.");
            return Ok(());
        }
        ledger
    };

    print_totals_on_change(&mut ledger);
    ledger.clear()?;
    println!("All transactions deleted.");
    Ok(())
}
