//! Account service
//!
//! Balance and available-funds calculation over any [`LedgerReader`], plus
//! account management on top of [`Storage`].

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{before_boundary, LedgerReader};
use crate::models::{Account, AccountBalance, AccountId, BudgetId, Flow, Money, Month};
use crate::storage::Storage;

/// How an account relates to the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    /// Tracked in the budget's totals
    OnBudget,
    /// Owned but not budgeted, such as a retirement account
    OffBudget,
    /// A counterparty such as an employer or a store
    External,
}

impl AccountKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "onbudget" | "on" => Some(Self::OnBudget),
            "offbudget" | "off" => Some(Self::OffBudget),
            "external" | "ext" => Some(Self::External),
            _ => None,
        }
    }
}

pub struct AccountService<'a, R: ?Sized = Storage> {
    reader: &'a R,
}

impl<'a, R: LedgerReader + ?Sized> AccountService<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Balance and available funds of an account as of the end of `upper`
    ///
    /// `None` means all time.
    pub fn balance_as_of(&self, account_id: AccountId, upper: Option<Month>) -> LedgerResult<AccountBalance> {
        let account = self
            .reader
            .account(account_id)?
            .ok_or_else(|| LedgerError::account_not_found(account_id.to_string()))?;
        self.balance_of(&account, upper)
    }

    /// Same as [`Self::balance_as_of`] for an already loaded account
    ///
    /// Income that arrives from an external account without an envelope and
    /// only becomes available after `upper` counts toward `balance` but not
    /// toward `available`.
    pub fn balance_of(&self, account: &Account, upper: Option<Month>) -> LedgerResult<AccountBalance> {
        let boundary = upper.map(|m| m.next());
        let transactions = self.reader.account_transactions(account.id, boundary)?;

        let opening = match account.initial_balance_date {
            Some(date) if !before_boundary(date, boundary) => Money::ZERO,
            _ => account.initial_balance,
        };

        let mut balance = opening;
        let mut pending = Money::ZERO;
        let mut sources: HashMap<AccountId, bool> = HashMap::new();

        for txn in &transactions {
            balance += txn.signed_for_account(account.id);

            let Some(upper) = upper else { continue };
            if txn.flow_for_account(account.id) != Some(Flow::Incoming)
                || txn.envelope_id.is_some()
                || txn.available_from <= upper
            {
                continue;
            }

            let external = match sources.get(&txn.source_account_id) {
                Some(external) => *external,
                None => {
                    let external = self
                        .reader
                        .account_including_deleted(txn.source_account_id)?
                        .is_some_and(|a| a.external);
                    sources.insert(txn.source_account_id, external);
                    external
                }
            };
            if external {
                pending += txn.amount;
            }
        }

        debug!(
            account = %account.id,
            upper = ?upper.map(|m| m.to_string()),
            transactions = transactions.len(),
            %balance,
            %pending,
            "computed account balance"
        );

        Ok(AccountBalance {
            account_id: account.id,
            balance,
            available: balance - pending,
        })
    }
}

impl<'a> AccountService<'a, Storage> {
    /// Create an account in a budget
    pub fn create(
        &self,
        budget_id: BudgetId,
        name: &str,
        kind: AccountKind,
        initial_balance: Money,
        initial_balance_date: Option<NaiveDate>,
    ) -> LedgerResult<Account> {
        let storage = self.reader;
        let name = name.trim();

        if storage.budget(budget_id)?.is_none() {
            return Err(LedgerError::budget_not_found(budget_id.to_string()));
        }

        if storage.accounts.name_exists(budget_id, name, None)? {
            return Err(LedgerError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let account = match kind {
            AccountKind::OnBudget => Account::new(budget_id, name),
            AccountKind::OffBudget => Account::off_budget(budget_id, name),
            AccountKind::External => Account::external(budget_id, name),
        }
        .with_initial_balance(initial_balance, initial_balance_date);

        account
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        storage.accounts.upsert(account.clone())?;
        storage.accounts.save()?;

        storage.log_create(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &account,
        )?;

        info!(account = %account.id, name = %account.name, "created account");
        Ok(account)
    }

    /// Find a live account by name or ID string
    pub fn find(&self, budget_id: BudgetId, identifier: &str) -> LedgerResult<Option<Account>> {
        let storage = self.reader;
        if let Some(account) = storage.accounts.get_by_name(budget_id, identifier)? {
            return Ok(Some(account));
        }

        match identifier.parse::<AccountId>() {
            Ok(id) => Ok(storage
                .accounts
                .get_active(id)?
                .filter(|a| a.budget_id == budget_id)),
            Err(_) => Ok(None),
        }
    }

    pub fn list(&self, budget_id: BudgetId) -> LedgerResult<Vec<Account>> {
        self.reader.accounts.get_by_budget(budget_id)
    }

    /// Every live account of a budget with its balance as of `upper`
    pub fn list_with_balances(
        &self,
        budget_id: BudgetId,
        upper: Option<Month>,
    ) -> LedgerResult<Vec<(Account, AccountBalance)>> {
        self.list(budget_id)?
            .into_iter()
            .map(|account| {
                let balance = self.balance_of(&account, upper)?;
                Ok((account, balance))
            })
            .collect()
    }

    pub fn rename(&self, id: AccountId, name: &str) -> LedgerResult<Account> {
        let storage = self.reader;
        let mut account = storage
            .accounts
            .get_active(id)?
            .ok_or_else(|| LedgerError::account_not_found(id.to_string()))?;
        let before = account.clone();

        let name = name.trim();
        if storage.accounts.name_exists(account.budget_id, name, Some(id))? {
            return Err(LedgerError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        account.name = name.to_string();
        account.updated_at = chrono::Utc::now();
        account
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        storage.accounts.upsert(account.clone())?;
        storage.accounts.save()?;
        storage.log_update(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &before,
            &account,
        )?;

        Ok(account)
    }

    /// Tombstone an account; its transactions stay in storage
    pub fn delete(&self, id: AccountId) -> LedgerResult<Account> {
        let storage = self.reader;
        let mut account = storage
            .accounts
            .get_active(id)?
            .ok_or_else(|| LedgerError::account_not_found(id.to_string()))?;

        account.mark_deleted();
        storage.accounts.upsert(account.clone())?;
        storage.accounts.save()?;
        storage.log_delete(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &account,
        )?;

        info!(account = %account.id, "deleted account");
        Ok(account)
    }
}
