pub mod add;
pub mod clear;
pub mod init;
pub mod list;
pub mod remove;
pub mod status;
pub mod summary;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::db::{SqliteStore, DB_FILE};
use crate::error::{Result, TallyError};
use crate::fmt::money;
use crate::ledger::LedgerStore;
use crate::persistence::Persistence;
use crate::settings::{load_settings, OnCorrupt};
use crate::store::KeyValueStore;
use crate::summary::Summary;

#[derive(Parser)]
#[command(name = "tally", about = "Track personal income and expenses.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and create the ledger database.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record an income or expense.
    Add {
        /// What the money was for, e.g. 'Salary'
        description: String,
        /// Positive amount, e.g. 12.50
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Transaction type: income or expense
        #[arg(long = "type")]
        kind: String,
    },
    /// List transactions, most recent first.
    List {
        /// Print an HTML fragment instead of a table
        #[arg(long)]
        html: bool,
    },
    /// Delete a transaction by id.
    Remove {
        /// Transaction id as shown by `tally list`
        id: u64,
    },
    /// Show total income, total expenses and balance.
    Summary,
    /// Delete all transactions.
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Discard the stored ledger even if it cannot be read
        #[arg(long)]
        force: bool,
    },
    /// Show where data lives and how many transactions it holds.
    Status,
}

pub(crate) fn db_path() -> Result<PathBuf> {
    let settings = load_settings()?;
    Ok(PathBuf::from(&settings.data_dir).join(DB_FILE))
}

fn open_persistence() -> Result<Persistence<SqliteStore>> {
    let path = db_path()?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(Persistence::new(SqliteStore::open(&path)?))
}

/// Composition root: wires the SQLite store into a ledger and applies the
/// configured corrupt-state policy.
pub(crate) fn open_ledger() -> Result<LedgerStore<SqliteStore>> {
    let settings = load_settings()?;
    hydrate(open_persistence, settings.on_corrupt)
}

/// `reopen` is called again when the policy falls back to an empty ledger.
fn hydrate<S: KeyValueStore>(
    reopen: impl Fn() -> Result<Persistence<S>>,
    on_corrupt: OnCorrupt,
) -> Result<LedgerStore<S>> {
    match LedgerStore::open(reopen()?) {
        Err(e @ TallyError::CorruptState { .. }) if on_corrupt == OnCorrupt::StartEmpty => {
            eprintln!("{} {e}", "Warning:".yellow().bold());
            eprintln!("Starting with an empty ledger; the next change will replace the stored data.");
            Ok(LedgerStore::open_empty(reopen()?))
        }
        Err(e @ TallyError::CorruptState { .. }) => {
            eprintln!("Run `tally clear --force` to discard the stored ledger and start over.");
            Err(e)
        }
        other => other,
    }
}

/// Explicit reset path: never reads the stored value.
pub(crate) fn open_ledger_discarding() -> Result<LedgerStore<SqliteStore>> {
    Ok(LedgerStore::open_empty(open_persistence()?))
}

pub(crate) fn totals_line(summary: &Summary) -> String {
    let balance = money(summary.balance);
    let balance = if summary.is_negative() {
        balance.red().bold()
    } else {
        balance.green().bold()
    };
    format!(
        "Income {}  Expenses {}  Balance {}",
        money(summary.total_income),
        money(summary.total_expense),
        balance
    )
}

/// Re-renders the totals whenever the ledger changes.
pub(crate) fn print_totals_on_change(ledger: &mut LedgerStore<SqliteStore>) {
    ledger.subscribe(|txns| println!("{}", totals_line(&Summary::of(txns))));
}

pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N]: ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::persistence::STORAGE_KEY;
    use crate::store::MemoryStore;

    fn corrupt_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, b"{oops").unwrap();
        store
    }

    #[test]
    fn test_hydrate_fail_policy_keeps_corrupt_state_error() {
        let err = hydrate(|| Ok(Persistence::new(corrupt_store())), OnCorrupt::Fail)
            .err()
            .unwrap();
        assert!(
            matches!(err, TallyError::CorruptState { ref key, .. } if key == STORAGE_KEY),
            "got: {err}"
        );
    }

    #[test]
    fn test_hydrate_start_empty_policy_reopens_empty() {
        let opened = RefCell::new(0);
        let ledger = hydrate(
            || {
                *opened.borrow_mut() += 1;
                Ok(Persistence::new(corrupt_store()))
            },
            OnCorrupt::StartEmpty,
        )
        .unwrap();
        assert!(ledger.is_empty());
        assert_eq!(*opened.borrow(), 2);
        assert_eq!(
            ledger.persistence().store().get(STORAGE_KEY).unwrap().as_deref(),
            Some(&b"{oops"[..])
        );
    }

    #[test]
    fn test_hydrate_passes_through_readable_ledgers() {
        let ledger = hydrate(|| Ok(Persistence::new(MemoryStore::new())), OnCorrupt::Fail).unwrap();
        assert!(ledger.is_empty());
    }
}
