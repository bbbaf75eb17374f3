//! Transaction service
//!
//! Validated create, update and delete of transactions. Every invariant is
//! checked here so the balance calculations can trust stored records.

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AccountId, BudgetId, EnvelopeId, Money, Month, Transaction, TransactionId,
};
use crate::storage::Storage;

pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<AccountId>,
    pub envelope_id: Option<EnvelopeId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn envelope(mut self, envelope_id: EnvelopeId) -> Self {
        self.envelope_id = Some(envelope_id);
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub budget_id: BudgetId,
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub envelope_id: Option<EnvelopeId>,
    pub amount: Money,
    pub date: NaiveDate,
    /// Defaults to the month of `date`
    pub available_from: Option<Month>,
    pub note: Option<String>,
}

/// Fields to change on an existing transaction
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` removes the envelope
    pub envelope_id: Option<Option<EnvelopeId>>,
    pub available_from: Option<Month>,
    pub note: Option<String>,
    pub reconciled_source: Option<bool>,
    pub reconciled_destination: Option<bool>,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateTransactionInput) -> LedgerResult<Transaction> {
        let mut txn = Transaction::new(
            input.budget_id,
            input.source_account_id,
            input.destination_account_id,
            input.date,
            input.amount,
        );
        txn.envelope_id = input.envelope_id;
        if let Some(month) = input.available_from {
            txn.available_from = month;
        }
        if let Some(note) = input.note {
            txn.note = note.trim().to_string();
        }

        self.check(&txn)?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &txn,
        )?;

        info!(transaction = %txn.id, amount = %txn.amount, date = %txn.date, "created transaction");
        Ok(txn)
    }

    /// Get a live transaction by ID
    pub fn get(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        Ok(self.storage.transactions.get(id)?.filter(|t| !t.is_deleted()))
    }

    /// Find a live transaction of a budget by full or short ID
    pub fn find(&self, budget_id: BudgetId, identifier: &str) -> LedgerResult<Option<Transaction>> {
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return Ok(self.get(id)?.filter(|t| t.budget_id == budget_id));
        }

        let short = identifier.trim_start_matches("txn-");
        let mut matches = self
            .storage
            .transactions
            .get_by_budget(budget_id, None)?
            .into_iter()
            .filter(|t| t.id.short().trim_start_matches("txn-") == short);

        match (matches.next(), matches.next()) {
            (Some(txn), None) => Ok(Some(txn)),
            (Some(_), Some(_)) => Err(LedgerError::Validation(format!(
                "Ambiguous transaction ID: {}",
                identifier
            ))),
            _ => Ok(None),
        }
    }

    /// Live transactions of a budget, newest first
    pub fn list(&self, budget_id: BudgetId, filter: TransactionFilter) -> LedgerResult<Vec<Transaction>> {
        let mut transactions = if let Some(account_id) = filter.account_id {
            self.storage.transactions.get_by_account(account_id, None)?
        } else if let Some(envelope_id) = filter.envelope_id {
            self.storage.transactions.get_by_envelope(envelope_id, None)?
        } else {
            self.storage.transactions.get_by_budget(budget_id, None)?
        };

        transactions.retain(|t| t.budget_id == budget_id);
        if let Some(envelope_id) = filter.envelope_id {
            transactions.retain(|t| t.envelope_id == Some(envelope_id));
        }
        if let Some(start) = filter.start_date {
            transactions.retain(|t| t.date >= start);
        }
        if let Some(end) = filter.end_date {
            transactions.retain(|t| t.date <= end);
        }

        transactions.reverse();
        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }

        Ok(transactions)
    }

    pub fn update(&self, id: TransactionId, input: UpdateTransactionInput) -> LedgerResult<Transaction> {
        let mut txn = self
            .get(id)?
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;
        let before = txn.clone();

        if let Some(amount) = input.amount {
            txn.amount = amount;
        }
        if let Some(date) = input.date {
            txn.date = date;
            // Keep the default of "available in its own month" when the date moves
            if before.available_from == before.month() || txn.available_from < txn.month() {
                txn.available_from = txn.month();
            }
        }
        if let Some(envelope_id) = input.envelope_id {
            txn.envelope_id = envelope_id;
        }
        if let Some(month) = input.available_from {
            txn.available_from = month;
        }
        if let Some(note) = input.note {
            txn.note = note.trim().to_string();
        }
        if let Some(reconciled) = input.reconciled_source {
            txn.reconciled_source = reconciled;
        }
        if let Some(reconciled) = input.reconciled_destination {
            txn.reconciled_destination = reconciled;
        }
        txn.updated_at = Utc::now();

        self.check(&txn)?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        self.storage.log_update(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &before,
            &txn,
        )?;

        Ok(txn)
    }

    /// Tombstone a transaction
    pub fn delete(&self, id: TransactionId) -> LedgerResult<Transaction> {
        let mut txn = self
            .get(id)?
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;

        txn.mark_deleted();
        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        self.storage.log_delete(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.to_string()),
            &txn,
        )?;

        info!(transaction = %txn.id, "deleted transaction");
        Ok(txn)
    }

    /// Resolve the referenced records and enforce every invariant
    fn check(&self, txn: &Transaction) -> LedgerResult<()> {
        let source = self
            .storage
            .accounts
            .get_active(txn.source_account_id)?
            .ok_or_else(|| LedgerError::account_not_found(txn.source_account_id.to_string()))?;
        let destination = self
            .storage
            .accounts
            .get_active(txn.destination_account_id)?
            .ok_or_else(|| {
                LedgerError::account_not_found(txn.destination_account_id.to_string())
            })?;

        if let Some(envelope_id) = txn.envelope_id {
            match self.storage.budgets.budget_of_envelope(envelope_id)? {
                None => return Err(LedgerError::envelope_not_found(envelope_id.to_string())),
                Some(budget) if budget != txn.budget_id => {
                    return Err(LedgerError::Validation(
                        "Envelope belongs to a different budget".into(),
                    ))
                }
                Some(_) => {}
            }
        }

        txn.validate_with_accounts(&source, &destination)
            .map_err(|e| LedgerError::Validation(e.to_string()))
    }
}
