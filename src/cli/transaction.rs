//! Transaction CLI commands
//!
//! A transaction moves money from a source account to a destination
//! account. Purchases go from an on-budget account to an external payee,
//! income comes from an external account into an on-budget one.

use std::collections::HashMap;

use clap::Subcommand;

use super::{parse_date, parse_money, parse_month, resolve_budget};
use crate::config::settings::Settings;
use crate::display::format_transaction_register;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Envelope, Transaction};
use crate::services::{
    AccountService, CreateTransactionInput, EnvelopeService, TransactionFilter,
    TransactionService, UpdateTransactionInput,
};
use crate::storage::Storage;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction
    Add {
        /// Source account name or ID
        from: String,
        /// Destination account name or ID
        to: String,
        /// Amount, always positive (e.g., "42.50")
        amount: String,
        /// Envelope to book the transaction on
        #[arg(short, long)]
        envelope: Option<String>,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// First month the money can be budgeted (YYYY-MM)
        #[arg(short, long)]
        available_from: Option<String>,
        /// Note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// List transactions, newest first
    List {
        /// Filter by account
        #[arg(long)]
        account: Option<String>,
        /// Filter by envelope
        #[arg(short, long)]
        envelope: Option<String>,
        /// Only transactions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,
        /// Only transactions on or before this date (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Change a transaction
    Edit {
        /// Transaction ID
        id: String,
        /// New amount
        #[arg(long)]
        amount: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// New envelope
        #[arg(short, long, conflicts_with = "no_envelope")]
        envelope: Option<String>,
        /// Remove the envelope
        #[arg(long)]
        no_envelope: bool,
        /// New availability month (YYYY-MM)
        #[arg(short, long)]
        available_from: Option<String>,
        /// New note
        #[arg(short, long)]
        note: Option<String>,
        /// Mark reconciled on the source account
        #[arg(long)]
        reconcile_source: bool,
        /// Mark reconciled on the destination account
        #[arg(long)]
        reconcile_destination: bool,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    budget: Option<&str>,
    cmd: TransactionCommands,
) -> LedgerResult<()> {
    let budget = resolve_budget(storage, settings, budget)?;
    let service = TransactionService::new(storage);
    let accounts = AccountService::new(storage);
    let envelopes = EnvelopeService::new(storage);

    let find_account = |identifier: &str| -> LedgerResult<Account> {
        accounts
            .find(budget.id, identifier)?
            .ok_or_else(|| LedgerError::account_not_found(identifier))
    };
    let find_envelope = |identifier: &str| -> LedgerResult<Envelope> {
        envelopes
            .find(budget.id, identifier)?
            .ok_or_else(|| LedgerError::envelope_not_found(identifier))
    };
    let find_transaction = |identifier: &str| -> LedgerResult<Transaction> {
        service
            .find(budget.id, identifier)?
            .ok_or_else(|| LedgerError::transaction_not_found(identifier))
    };

    match cmd {
        TransactionCommands::Add {
            from,
            to,
            amount,
            envelope,
            date,
            available_from,
            note,
        } => {
            let source = find_account(&from)?;
            let destination = find_account(&to)?;
            let envelope_id = envelope.map(|e| find_envelope(&e)).transpose()?.map(|e| e.id);
            let available_from = available_from
                .map(|m| parse_month(Some(&m)))
                .transpose()?;

            let txn = service.create(CreateTransactionInput {
                budget_id: budget.id,
                source_account_id: source.id,
                destination_account_id: destination.id,
                envelope_id,
                amount: parse_money(&amount)?,
                date: parse_date(date.as_deref())?,
                available_from,
                note,
            })?;

            println!(
                "Recorded {} from {} to {} on {}",
                txn.amount.format_with_symbol(&budget.currency),
                source.name,
                destination.name,
                txn.date.format(&settings.date_format)
            );
            println!("  ID: {}", txn.id.short());
        }

        TransactionCommands::List {
            account,
            envelope,
            since,
            until,
            limit,
        } => {
            let mut filter = TransactionFilter::new().limit(limit);
            if let Some(account) = account {
                filter = filter.account(find_account(&account)?.id);
            }
            if let Some(envelope) = envelope {
                filter = filter.envelope(find_envelope(&envelope)?.id);
            }
            filter.start_date = since.map(|d| parse_date(Some(&d))).transpose()?;
            filter.end_date = until.map(|d| parse_date(Some(&d))).transpose()?;

            let transactions = service.list(budget.id, filter)?;
            let account_names: HashMap<_, _> = accounts
                .list(budget.id)?
                .into_iter()
                .map(|a| (a.id, a.name))
                .collect();
            let envelope_names: HashMap<_, _> = envelopes
                .list(budget.id)?
                .into_iter()
                .map(|e| (e.id, e.name))
                .collect();

            print!(
                "{}",
                format_transaction_register(
                    &transactions,
                    &account_names,
                    &envelope_names,
                    &budget.currency,
                    &settings.date_format,
                )
            );
        }

        TransactionCommands::Edit {
            id,
            amount,
            date,
            envelope,
            no_envelope,
            available_from,
            note,
            reconcile_source,
            reconcile_destination,
        } => {
            let txn = find_transaction(&id)?;

            let envelope_id = if no_envelope {
                Some(None)
            } else {
                envelope
                    .map(|e| find_envelope(&e).map(|e| Some(e.id)))
                    .transpose()?
            };

            let input = UpdateTransactionInput {
                amount: amount.map(|a| parse_money(&a)).transpose()?,
                date: date.map(|d| parse_date(Some(&d))).transpose()?,
                envelope_id,
                available_from: available_from
                    .map(|m| parse_month(Some(&m)))
                    .transpose()?,
                note,
                reconciled_source: reconcile_source.then_some(true),
                reconciled_destination: reconcile_destination.then_some(true),
            };

            let updated = service.update(txn.id, input)?;
            println!("Updated transaction {}", updated.id.short());
        }

        TransactionCommands::Delete { id } => {
            let txn = find_transaction(&id)?;
            service.delete(txn.id)?;
            println!(
                "Deleted transaction {} ({})",
                txn.id.short(),
                txn.amount.format_with_symbol(&budget.currency)
            );
        }
    }

    Ok(())
}
