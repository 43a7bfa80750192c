use crate::error::Result;
use crate::models::TransactionId;

use super::{open_ledger, print_totals_on_change};

pub fn run(id: u64) -> Result<()> {
    let mut ledger = open_ledger()?;
    print_totals_on_change(&mut ledger);
    let id = TransactionId(id);
    if ledger.remove(id)? {
        println!("Removed transaction {id}.");
    } else {
        println!("No transaction with id {id}.");
    }
    Ok(())
}
