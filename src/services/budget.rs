//! Budget service
//!
//! Aggregates account and envelope figures across a budget for one month,
//! and manages budgets and bulk allocations on top of [`Storage`].

use std::collections::HashMap;

use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::LedgerReader;
use crate::models::{
    Account, AccountId, Budget, BudgetId, BudgetMonth, CategoryMonth, Money, Month, MonthConfig,
};
use crate::storage::Storage;

use super::account::AccountService;
use super::envelope::{EnvelopeService, MonthConfigUpdate};

/// Where bulk allocations take their amounts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMode {
    /// Repeat each envelope's allocation of the previous month
    AllocateLastMonthBudget,
    /// Allocate what each envelope spent in the previous month
    AllocateLastMonthSpend,
}

impl AllocationMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "lastmonthbudget" | "budget" | "allocatelastmonthbudget" => {
                Some(Self::AllocateLastMonthBudget)
            }
            "lastmonthspend" | "spend" | "allocatelastmonthspend" => {
                Some(Self::AllocateLastMonthSpend)
            }
            _ => None,
        }
    }
}

pub struct BudgetService<'a, R: ?Sized = Storage> {
    reader: &'a R,
}

impl<'a, R: LedgerReader + ?Sized> BudgetService<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Category and budget totals for `target`
    ///
    /// Any storage failure aborts the whole aggregation.
    pub fn month(&self, budget_id: BudgetId, target: Month) -> LedgerResult<BudgetMonth> {
        let accounts = self.reader.budget_accounts(budget_id)?;

        let income = self.income(budget_id, target)?;

        let envelopes = EnvelopeService::new(self.reader);
        let mut categories = Vec::new();
        let mut allocated = Money::ZERO;
        let mut balance = Money::ZERO;
        let mut spent = Money::ZERO;

        for category in self.reader.budget_categories(budget_id)? {
            let mut summary = CategoryMonth::new(category.id, category.name.clone());
            for envelope in self.reader.category_envelopes(category.id)? {
                summary.push(envelopes.month_of(&envelope, target)?);
            }
            allocated += summary.allocation;
            balance += summary.balance;
            spent += summary.spent;
            categories.push(summary);
        }

        let account_service = AccountService::new(self.reader);
        let mut on_budget_available = Money::ZERO;
        for account in accounts.iter().filter(|a| a.on_budget) {
            on_budget_available += account_service.balance_of(account, Some(target))?.available;
        }

        let available = on_budget_available - balance;

        debug!(
            budget = %budget_id,
            %target,
            %income,
            %allocated,
            %available,
            "aggregated budget month"
        );

        Ok(BudgetMonth {
            budget_id,
            month: target,
            income,
            allocated,
            balance,
            spent,
            available,
            categories,
        })
    }

    /// Money from external accounts into on-budget accounts, outside any
    /// envelope, that becomes available in `target`
    ///
    /// Tombstoned accounts still classify the transactions that reference
    /// them.
    fn income(&self, budget_id: BudgetId, target: Month) -> LedgerResult<Money> {
        // available_from is never before the month of the date
        let transactions = self.reader.budget_transactions(budget_id, Some(target.next()))?;
        let mut known: HashMap<AccountId, Option<Account>> = HashMap::new();
        let mut income = Money::ZERO;

        for txn in transactions
            .iter()
            .filter(|t| t.envelope_id.is_none() && t.available_from == target)
        {
            let external = self
                .lookup(txn.source_account_id, &mut known)?
                .is_some_and(|a| a.external);
            let on_budget = self
                .lookup(txn.destination_account_id, &mut known)?
                .is_some_and(|a| a.on_budget);
            if external && on_budget {
                income += txn.amount;
            }
        }

        Ok(income)
    }

    fn lookup<'m>(
        &self,
        id: AccountId,
        known: &'m mut HashMap<AccountId, Option<Account>>,
    ) -> LedgerResult<Option<&'m Account>> {
        if !known.contains_key(&id) {
            let account = self.reader.account_including_deleted(id)?;
            known.insert(id, account);
        }
        Ok(known.get(&id).and_then(|a| a.as_ref()))
    }
}

impl<'a> BudgetService<'a, Storage> {
    pub fn create(&self, name: &str, currency_symbol: &str) -> LedgerResult<Budget> {
        let storage = self.reader;
        let name = name.trim();

        if storage.budgets.get_budget_by_name(name)?.is_some() {
            return Err(LedgerError::Duplicate {
                entity_type: "Budget",
                identifier: name.to_string(),
            });
        }

        let budget = Budget::new(name).with_currency(currency_symbol);
        budget
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        storage.budgets.upsert_budget(budget.clone())?;
        storage.budgets.save()?;
        storage.log_create(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.name.clone()),
            &budget,
        )?;

        info!(budget = %budget.id, name = %budget.name, "created budget");
        Ok(budget)
    }

    /// Find a live budget by name or ID string
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Budget>> {
        let storage = self.reader;
        if let Some(budget) = storage.budgets.get_budget_by_name(identifier)? {
            return Ok(Some(budget));
        }

        match identifier.parse::<BudgetId>() {
            Ok(id) => storage.budgets.get_budget(id),
            Err(_) => Ok(None),
        }
    }

    pub fn list(&self) -> LedgerResult<Vec<Budget>> {
        self.reader.budgets.get_all_budgets()
    }

    pub fn rename(&self, id: BudgetId, name: &str) -> LedgerResult<Budget> {
        let storage = self.reader;
        let mut budget = storage
            .budgets
            .get_budget(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))?;
        let before = budget.clone();

        budget.rename(name.trim());
        budget
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        storage.budgets.upsert_budget(budget.clone())?;
        storage.budgets.save()?;
        storage.log_update(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.name.clone()),
            &before,
            &budget,
        )?;

        Ok(budget)
    }

    pub fn delete(&self, id: BudgetId) -> LedgerResult<Budget> {
        let storage = self.reader;
        let mut budget = storage
            .budgets
            .get_budget(id)?
            .ok_or_else(|| LedgerError::budget_not_found(id.to_string()))?;

        budget.mark_deleted();
        storage.budgets.upsert_budget(budget.clone())?;
        storage.budgets.save()?;
        storage.log_delete(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.name.clone()),
            &budget,
        )?;

        info!(budget = %budget.id, "deleted budget");
        Ok(budget)
    }

    /// Set every envelope's allocation for `month` from the previous month
    ///
    /// Envelopes with nothing to copy and no record for `month` are left
    /// untouched.
    pub fn set_allocations(
        &self,
        budget_id: BudgetId,
        month: Month,
        mode: AllocationMode,
    ) -> LedgerResult<Vec<MonthConfig>> {
        let storage = self.reader;
        if storage.budgets.get_budget(budget_id)?.is_none() {
            return Err(LedgerError::budget_not_found(budget_id.to_string()));
        }

        let envelopes = EnvelopeService::new(storage);
        let previous = month.prev();
        let mut configs = Vec::new();

        for envelope in storage.budgets.get_budget_envelopes(budget_id)? {
            let last = envelopes.month_of(&envelope, previous)?;
            let amount = match mode {
                AllocationMode::AllocateLastMonthBudget => last.allocation,
                AllocationMode::AllocateLastMonthSpend => last.spent.max(Money::ZERO),
            };

            // a zero record would turn a silent month into a configured one
            if amount.is_zero() && storage.month_configs.get(envelope.id, month)?.is_none() {
                continue;
            }

            configs.push(envelopes.set_month_config(
                envelope.id,
                month,
                MonthConfigUpdate {
                    allocation: Some(amount),
                    ..Default::default()
                },
            )?);
        }

        info!(budget = %budget_id, %month, ?mode, envelopes = configs.len(), "set allocations");
        Ok(configs)
    }

    /// Zero every envelope allocation of the budget in `month`
    pub fn clear_allocations(&self, budget_id: BudgetId, month: Month) -> LedgerResult<usize> {
        let storage = self.reader;
        let envelopes = EnvelopeService::new(storage);
        let mut cleared = 0;

        for envelope in storage.budgets.get_budget_envelopes(budget_id)? {
            let Some(config) = storage.month_configs.get(envelope.id, month)? else {
                continue;
            };
            if config.allocation.is_zero() {
                continue;
            }
            envelopes.set_month_config(
                envelope.id,
                month,
                MonthConfigUpdate {
                    allocation: Some(Money::ZERO),
                    ..Default::default()
                },
            )?;
            cleared += 1;
        }

        info!(budget = %budget_id, %month, cleared, "cleared allocations");
        Ok(cleared)
    }
}
