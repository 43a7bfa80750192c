use std::cmp::Reverse;

use chrono::{DateTime, Local, Utc};

use crate::error::{Result, ValidationError};
use crate::fmt::{money, signed_money};
use crate::ledger::LedgerStore;
use crate::models::{validate_entry, Kind, Transaction};
use crate::store::KeyValueStore;
use crate::summary::Summary;

pub const EMPTY_STATE: &str = "No transactions yet. Add one to get started!";

/// Raw, unparsed form fields as the user typed them.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub description: String,
    pub amount: String,
    pub kind: String,
}

/// A form that passed validation, ready for `LedgerStore::add`.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub description: String,
    pub amount: f64,
    pub kind: Kind,
}

impl FormInput {
    pub fn new(description: impl Into<String>, amount: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            kind: kind.into(),
        }
    }

    pub fn parse(&self) -> std::result::Result<Draft, ValidationError> {
        let text = self.amount.trim();
        let amount: f64 = text
            .parse()
            .map_err(|_| ValidationError::InvalidAmount(self.amount.clone()))?;
        if !amount.is_finite() {
            return Err(ValidationError::InvalidAmount(self.amount.clone()));
        }
        let kind: Kind = self.kind.parse()?;
        let description = validate_entry(&self.description, amount)?;
        Ok(Draft {
            description,
            amount,
            kind,
        })
    }
}

/// Validates the form and records it. Nothing is applied when parsing fails.
pub fn submit<S: KeyValueStore>(store: &mut LedgerStore<S>, input: &FormInput) -> Result<Transaction> {
    let draft = input.parse()?;
    store.add(&draft.description, draft.amount, draft.kind)
}

/// Most recent first. Equal timestamps fall back to the higher id first.
pub fn display_order(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by_key(|t| Reverse((t.recorded_at, t.id)));
    sorted
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Terminal counterpart of `escape_html`: control characters (escape
/// sequences included) are replaced so a description cannot restyle the screen.
pub fn escape_terminal(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '\u{fffd}' } else { c })
        .collect()
}

pub fn format_recorded_at(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %d, %Y, %I:%M %p").to_string()
}

/// HTML fragment for the transaction list followed by the three summary cards.
pub fn render_html(transactions: &[Transaction], summary: &Summary) -> String {
    let mut html = String::from("<div id=\"transactionsList\">\n");
    if transactions.is_empty() {
        html.push_str(&format!("  <p class=\"empty-state\">{EMPTY_STATE}</p>\n"));
    }
    for txn in display_order(transactions) {
        let kind = txn.kind.as_str();
        html.push_str(&format!(
            "  <div class=\"transaction-item {kind}\" data-id=\"{id}\">\n\
             \x20   <div class=\"transaction-info\">\n\
             \x20     <p class=\"transaction-description\">{description}</p>\n\
             \x20     <p class=\"transaction-date\">{date}</p>\n\
             \x20   </div>\n\
             \x20   <span class=\"transaction-amount {kind}\">{amount}</span>\n\
             \x20 </div>\n",
            id = txn.id,
            description = escape_html(&txn.description),
            date = format_recorded_at(&txn.recorded_at),
            amount = signed_money(txn.amount, txn.kind),
        ));
    }
    html.push_str("</div>\n");

    let balance_class = if summary.is_negative() { "balance negative" } else { "balance" };
    html.push_str(&format!(
        "<div class=\"summary\">\n\
         \x20 <p id=\"totalIncome\">{}</p>\n\
         \x20 <p id=\"totalExpense\">{}</p>\n\
         \x20 <p id=\"balance\" class=\"{balance_class}\">{}</p>\n\
         </div>\n",
        money(summary.total_income),
        money(summary.total_expense),
        money(summary.balance),
    ));
    html
}
