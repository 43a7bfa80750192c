use crate::error::Result;
use crate::fmt::format_bytes;
use crate::persistence::STORAGE_KEY;
use crate::settings::load_settings;

use super::{db_path, open_ledger};

pub fn run() -> Result<()> {
    let settings = load_settings()?;
    let db_path = db_path()?;

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Key:        {STORAGE_KEY}");

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));
        let ledger = open_ledger()?;
        let income = ledger.list().iter().filter(|t| t.is_income()).count();
        println!();
        println!("Transactions:  {}", ledger.len());
        println!("Income:        {income}");
        println!("Expenses:      {}", ledger.len() - income);
    } else {
        println!();
        println!("Database not found. Run `tally init` to set up.");
    }
    Ok(())
}
