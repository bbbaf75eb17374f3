//! Transaction register formatting

use std::collections::HashMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{AccountId, EnvelopeId, Transaction};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "From")]
    source: String,
    #[tabled(rename = "To")]
    destination: String,
    #[tabled(rename = "Envelope")]
    envelope: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Available")]
    available_from: String,
    #[tabled(rename = "Note")]
    note: String,
}

/// Transactions as a register, resolving ids through the given name maps
pub fn format_transaction_register(
    transactions: &[Transaction],
    accounts: &HashMap<AccountId, String>,
    envelopes: &HashMap<EnvelopeId, String>,
    symbol: &str,
    date_format: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let account_name = |id: &AccountId| {
        accounts
            .get(id)
            .map(|n| super::truncate(n, 20))
            .unwrap_or_else(|| id.short())
    };

    let rows = transactions.iter().map(|txn| TransactionRow {
        id: txn.id.short(),
        date: txn.date.format(date_format).to_string(),
        source: account_name(&txn.source_account_id),
        destination: account_name(&txn.destination_account_id),
        envelope: txn
            .envelope_id
            .map(|id| {
                envelopes
                    .get(&id)
                    .map(|n| super::truncate(n, 20))
                    .unwrap_or_else(|| id.short())
            })
            .unwrap_or_default(),
        amount: txn.amount.format_with_symbol(symbol),
        available_from: if txn.available_from == txn.month() {
            String::new()
        } else {
            txn.available_from.to_string()
        },
        note: super::truncate(&txn.note, 30),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}
