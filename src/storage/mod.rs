//! Storage layer for envelope-ledger
//!
//! JSON file repositories with atomic writes, held behind one [`Storage`]
//! coordinator that also owns the audit log and implements [`LedgerReader`].

pub mod accounts;
pub mod budgets;
pub mod file_io;
pub mod init;
pub mod month_configs;
pub mod transactions;

pub use accounts::AccountRepository;
pub use budgets::BudgetRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::{create_budget_with_defaults, initialize_storage};
pub use month_configs::MonthConfigRepository;
pub use transactions::TransactionRepository;

use serde::Serialize;
use tracing::debug;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::LedgerReader;
use crate::models::{
    Account, AccountId, Budget, BudgetId, Category, CategoryId, Envelope, EnvelopeId, Month,
    MonthConfig, Transaction,
};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    audit: AuditLogger,
    pub budgets: BudgetRepository,
    pub accounts: AccountRepository,
    pub transactions: TransactionRepository,
    pub month_configs: MonthConfigRepository,
}

impl Storage {
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            budgets: BudgetRepository::new(paths.budget_file()),
            accounts: AccountRepository::new(paths.accounts_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            month_configs: MonthConfigRepository::new(paths.allocations_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn load_all(&mut self) -> Result<(), LedgerError> {
        self.budgets.load()?;
        self.accounts.load()?;
        self.transactions.load()?;
        self.month_configs.load()?;
        debug!(base_dir = %self.paths.base_dir().display(), "loaded ledger data");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> LedgerResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> LedgerResult<()> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> LedgerResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}

impl LedgerReader for Storage {
    fn budget(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        self.budgets.get_budget(id)
    }

    fn account(&self, id: AccountId) -> LedgerResult<Option<Account>> {
        self.accounts.get_active(id)
    }

    fn account_including_deleted(&self, id: AccountId) -> LedgerResult<Option<Account>> {
        self.accounts.get(id)
    }

    fn envelope(&self, id: EnvelopeId) -> LedgerResult<Option<Envelope>> {
        self.budgets.get_envelope(id)
    }

    fn budget_accounts(&self, budget: BudgetId) -> LedgerResult<Vec<Account>> {
        self.accounts.get_by_budget(budget)
    }

    fn budget_categories(&self, budget: BudgetId) -> LedgerResult<Vec<Category>> {
        self.budgets.get_categories(budget)
    }

    fn category_envelopes(&self, category: CategoryId) -> LedgerResult<Vec<Envelope>> {
        self.budgets.get_envelopes(category)
    }

    fn envelope_transactions(
        &self,
        envelope: EnvelopeId,
        until: Option<Month>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.transactions.get_by_envelope(envelope, until)
    }

    fn account_transactions(
        &self,
        account: AccountId,
        until: Option<Month>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.transactions.get_by_account(account, until)
    }

    fn budget_transactions(
        &self,
        budget: BudgetId,
        until: Option<Month>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.transactions.get_by_budget(budget, until)
    }

    fn month_configs(
        &self,
        envelope: EnvelopeId,
        until: Option<Month>,
    ) -> LedgerResult<Vec<MonthConfig>> {
        self.month_configs.get_for_envelope(envelope, until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, storage) = create_test_storage();
        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_save_and_load_all() {
        let (temp_dir, storage) = create_test_storage();
        let budget = Budget::new("Home");
        let checking = Account::new(budget.id, "Checking");
        storage.budgets.upsert_budget(budget.clone()).unwrap();
        storage.accounts.upsert(checking.clone()).unwrap();
        storage.budgets.save().unwrap();
        storage.accounts.save().unwrap();

        let mut reloaded =
            Storage::new(LedgerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        reloaded.load_all().unwrap();
        assert!(reloaded.budget(budget.id).unwrap().is_some());
        assert_eq!(reloaded.budget_accounts(budget.id).unwrap().len(), 1);
    }

    #[test]
    fn test_reader_excludes_tombstones() {
        let (_temp_dir, storage) = create_test_storage();
        let budget = BudgetId::new();
        let mut card = Account::new(budget, "Card");
        let store = Account::external(budget, "Store");
        card.mark_deleted();
        storage.accounts.upsert(card.clone()).unwrap();
        storage.accounts.upsert(store.clone()).unwrap();

        let mut txn = Transaction::new(
            budget,
            card.id,
            store.id,
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            Money::from_cents(500),
        );
        txn.mark_deleted();
        storage.transactions.upsert(txn).unwrap();

        assert!(storage.account(card.id).unwrap().is_none());
        assert!(storage.account_including_deleted(card.id).unwrap().is_some());
        assert!(storage.budget_transactions(budget, None).unwrap().is_empty());
        assert!(storage.account_transactions(store.id, None).unwrap().is_empty());
    }

    #[test]
    fn test_audit_helpers_append() {
        let (_temp_dir, storage) = create_test_storage();
        let budget = Budget::new("Home");
        storage
            .log_create(EntityType::Budget, budget.id.to_string(), Some(budget.name.clone()), &budget)
            .unwrap();

        let mut renamed = budget.clone();
        renamed.rename("House");
        storage
            .log_update(EntityType::Budget, budget.id.to_string(), None, &budget, &renamed)
            .unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[1]
            .diff_summary
            .as_deref()
            .unwrap()
            .contains("name: \"Home\" -> \"House\""));
    }
}
