//! Account repository for JSON storage
//!
//! Manages loading and saving accounts to accounts.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Account, AccountId, BudgetId};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AccountData {
    accounts: Vec<Account>,
}

/// Repository for account persistence
pub struct AccountRepository {
    path: PathBuf,
    data: RwLock<HashMap<AccountId, Account>>,
}

impl AccountRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: AccountData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        data.clear();
        for account in file_data.accounts {
            data.insert(account.id, account);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let data = read_lock(&self.data)?;

        let mut accounts: Vec<_> = data.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));

        write_json_atomic(&self.path, &AccountData { accounts })
    }

    /// Get an account by ID, including tombstoned ones
    pub fn get(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// Get a live account by ID
    pub fn get_active(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        Ok(self.get(id)?.filter(|a| !a.is_deleted()))
    }

    /// Live accounts of a budget, sorted by name
    pub fn get_by_budget(&self, budget_id: BudgetId) -> Result<Vec<Account>, LedgerError> {
        let data = read_lock(&self.data)?;

        let mut accounts: Vec<_> = data
            .values()
            .filter(|a| a.budget_id == budget_id && !a.is_deleted())
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(accounts)
    }

    /// Find a live account in a budget by name (case-insensitive)
    pub fn get_by_name(
        &self,
        budget_id: BudgetId,
        name: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let name_lower = name.to_lowercase();
        Ok(self
            .get_by_budget(budget_id)?
            .into_iter()
            .find(|a| a.name.to_lowercase() == name_lower))
    }

    /// Check if a live account with this name exists, optionally excluding one ID
    pub fn name_exists(
        &self,
        budget_id: BudgetId,
        name: &str,
        exclude_id: Option<AccountId>,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .get_by_name(budget_id, name)?
            .is_some_and(|a| Some(a.id) != exclude_id))
    }

    pub fn upsert(&self, account: Account) -> Result<(), LedgerError> {
        write_lock(&self.data)?.insert(account.id, account);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, AccountRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = AccountRepository::new(temp_dir.path().join("accounts.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let budget = BudgetId::new();
        let account = Account::new(budget, "Checking");
        repo.upsert(account.clone()).unwrap();
        repo.save().unwrap();

        let reloaded = AccountRepository::new(temp_dir.path().join("accounts.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get(account.id).unwrap().unwrap().name, "Checking");
    }

    #[test]
    fn test_tombstoned_accounts_hidden() {
        let (_temp_dir, repo) = create_test_repo();
        let budget = BudgetId::new();
        let mut account = Account::new(budget, "Old Card");
        account.mark_deleted();
        repo.upsert(account.clone()).unwrap();
        repo.upsert(Account::new(budget, "Checking")).unwrap();

        assert_eq!(repo.get_by_budget(budget).unwrap().len(), 1);
        assert!(repo.get_active(account.id).unwrap().is_none());
        assert!(repo.get(account.id).unwrap().is_some());
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_name_exists() {
        let (_temp_dir, repo) = create_test_repo();
        let budget = BudgetId::new();
        let account = Account::new(budget, "Checking");
        repo.upsert(account.clone()).unwrap();

        assert!(repo.name_exists(budget, "checking", None).unwrap());
        assert!(!repo.name_exists(budget, "checking", Some(account.id)).unwrap());
        assert!(!repo.name_exists(BudgetId::new(), "Checking", None).unwrap());
    }
}
