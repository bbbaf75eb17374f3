//! Transaction repository for JSON storage
//!
//! Manages transactions.json and keeps per-account and per-envelope indexes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::ledger::before_boundary;
use crate::models::{AccountId, BudgetId, EnvelopeId, Month, Transaction, TransactionId};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

#[derive(Default)]
struct Indexed {
    data: HashMap<TransactionId, Transaction>,
    by_account: HashMap<AccountId, Vec<TransactionId>>,
    by_envelope: HashMap<EnvelopeId, Vec<TransactionId>>,
}

impl Indexed {
    fn insert(&mut self, txn: Transaction) {
        if let Some(previous) = self.data.remove(&txn.id) {
            self.unindex(&previous);
        }

        self.by_account
            .entry(txn.source_account_id)
            .or_default()
            .push(txn.id);
        self.by_account
            .entry(txn.destination_account_id)
            .or_default()
            .push(txn.id);
        if let Some(envelope_id) = txn.envelope_id {
            self.by_envelope.entry(envelope_id).or_default().push(txn.id);
        }

        self.data.insert(txn.id, txn);
    }

    fn unindex(&mut self, txn: &Transaction) {
        for account in [txn.source_account_id, txn.destination_account_id] {
            if let Some(ids) = self.by_account.get_mut(&account) {
                ids.retain(|id| *id != txn.id);
            }
        }
        if let Some(ids) = txn.envelope_id.and_then(|e| self.by_envelope.get_mut(&e)) {
            ids.retain(|id| *id != txn.id);
        }
    }

    fn live(&self, ids: Option<&Vec<TransactionId>>, until: Option<Month>) -> Vec<Transaction> {
        let mut list: Vec<_> = ids
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.data.get(id))
            .filter(|t| !t.is_deleted() && before_boundary(t.date, until))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        list
    }
}

/// Repository for transaction persistence with indexing
pub struct TransactionRepository {
    path: PathBuf,
    inner: RwLock<Indexed>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            inner: RwLock::new(Indexed::default()),
        }
    }

    /// Load transactions from disk and rebuild indexes
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut inner = write_lock(&self.inner)?;
        *inner = Indexed::default();
        for txn in file_data.transactions {
            inner.insert(txn);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let inner = read_lock(&self.inner)?;

        let mut transactions: Vec<_> = inner.data.values().cloned().collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    /// Get a transaction by ID, including tombstoned ones
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        Ok(read_lock(&self.inner)?.data.get(&id).cloned())
    }

    /// Live transactions touching an account, oldest first
    pub fn get_by_account(
        &self,
        account_id: AccountId,
        until: Option<Month>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let inner = read_lock(&self.inner)?;
        Ok(inner.live(inner.by_account.get(&account_id), until))
    }

    /// Live transactions tagged with an envelope, oldest first
    pub fn get_by_envelope(
        &self,
        envelope_id: EnvelopeId,
        until: Option<Month>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let inner = read_lock(&self.inner)?;
        Ok(inner.live(inner.by_envelope.get(&envelope_id), until))
    }

    /// Live transactions of a budget, oldest first
    pub fn get_by_budget(
        &self,
        budget_id: BudgetId,
        until: Option<Month>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let inner = read_lock(&self.inner)?;
        let mut list: Vec<_> = inner
            .data
            .values()
            .filter(|t| t.budget_id == budget_id)
            .filter(|t| !t.is_deleted() && before_boundary(t.date, until))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(list)
    }

    /// Insert or replace a transaction, keeping indexes in sync
    pub fn upsert(&self, txn: Transaction) -> Result<(), LedgerError> {
        write_lock(&self.inner)?.insert(txn);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(read_lock(&self.inner)?.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        (temp_dir, repo)
    }

    fn txn(source: AccountId, destination: AccountId, y: i32, m: u32, d: u32) -> Transaction {
        Transaction::new(
            BudgetId::new(),
            source,
            destination,
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            Money::from_cents(1000),
        )
    }

    #[test]
    fn test_indexes_both_accounts() {
        let (_temp_dir, repo) = create_test_repo();
        let checking = AccountId::new();
        let store = AccountId::new();
        repo.upsert(txn(checking, store, 2025, 1, 10)).unwrap();

        assert_eq!(repo.get_by_account(checking, None).unwrap().len(), 1);
        assert_eq!(repo.get_by_account(store, None).unwrap().len(), 1);
    }

    #[test]
    fn test_month_boundary_is_exclusive() {
        let (_temp_dir, repo) = create_test_repo();
        let envelope = EnvelopeId::new();
        let checking = AccountId::new();
        let store = AccountId::new();
        repo.upsert(txn(checking, store, 2025, 1, 31).with_envelope(envelope))
            .unwrap();
        repo.upsert(txn(checking, store, 2025, 2, 1).with_envelope(envelope))
            .unwrap();

        let until_feb = repo
            .get_by_envelope(envelope, Some(Month::new(2025, 2)))
            .unwrap();
        assert_eq!(until_feb.len(), 1);
        assert_eq!(repo.get_by_envelope(envelope, None).unwrap().len(), 2);
    }

    #[test]
    fn test_reindex_on_update() {
        let (_temp_dir, repo) = create_test_repo();
        let first = EnvelopeId::new();
        let second = EnvelopeId::new();
        let mut t = txn(AccountId::new(), AccountId::new(), 2025, 1, 5).with_envelope(first);
        repo.upsert(t.clone()).unwrap();

        t.envelope_id = Some(second);
        repo.upsert(t).unwrap();

        assert!(repo.get_by_envelope(first, None).unwrap().is_empty());
        assert_eq!(repo.get_by_envelope(second, None).unwrap().len(), 1);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_tombstones_excluded_but_kept() {
        let (temp_dir, repo) = create_test_repo();
        let checking = AccountId::new();
        let mut t = txn(checking, AccountId::new(), 2025, 1, 5);
        t.mark_deleted();
        repo.upsert(t.clone()).unwrap();
        repo.save().unwrap();

        let reloaded = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        reloaded.load().unwrap();
        assert!(reloaded.get_by_account(checking, None).unwrap().is_empty());
        assert!(reloaded.get(t.id).unwrap().unwrap().is_deleted());
    }
}
