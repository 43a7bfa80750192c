//! Personal income and expense ledger.
//!
//! The core is [`ledger::LedgerStore`], which owns the transaction list and
//! saves it through [`persistence::Persistence`] into any
//! [`store::KeyValueStore`]. [`summary::Summary`] derives the totals and
//! [`view`] holds the form parsing and rendering used by the `tally` binary.

pub mod cli;
pub mod clock;
pub mod db;
pub mod error;
pub mod fmt;
pub mod ledger;
pub mod models;
pub mod persistence;
pub mod settings;
pub mod store;
pub mod summary;
pub mod view;
