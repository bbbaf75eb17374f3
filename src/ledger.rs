//! Read boundary between the ledger engine and persistence
//!
//! The balance calculations only ever see the world through [`LedgerReader`].
//! Every `until` argument is an exclusive month boundary: records dated in
//! `until` or later are left out, and `None` means all time. Tombstoned
//! records are never returned.
//!
//! Implementations are not required to offer a consistent snapshot across
//! calls. A calculation issues several independent reads, so a writer that
//! runs concurrently can make a result reflect a mix of old and new state.
//! Callers that need a consistent view must hold their own isolation
//! boundary around the whole calculation.

use crate::error::LedgerResult;
use crate::models::{
    Account, AccountId, Budget, BudgetId, Category, CategoryId, Envelope, EnvelopeId, Month,
    MonthConfig, Transaction,
};

pub trait LedgerReader {
    fn budget(&self, id: BudgetId) -> LedgerResult<Option<Budget>>;

    fn account(&self, id: AccountId) -> LedgerResult<Option<Account>>;

    /// Account by ID even when tombstoned
    ///
    /// Used to classify transactions that reference the account, so that
    /// deleting a counterparty never rewrites past figures.
    fn account_including_deleted(&self, id: AccountId) -> LedgerResult<Option<Account>>;

    fn envelope(&self, id: EnvelopeId) -> LedgerResult<Option<Envelope>>;

    fn budget_accounts(&self, budget: BudgetId) -> LedgerResult<Vec<Account>>;

    /// Categories of a budget, in display order
    fn budget_categories(&self, budget: BudgetId) -> LedgerResult<Vec<Category>>;

    /// Envelopes of a category, in display order
    fn category_envelopes(&self, category: CategoryId) -> LedgerResult<Vec<Envelope>>;

    /// Transactions tagged with `envelope` dated before `until`
    fn envelope_transactions(
        &self,
        envelope: EnvelopeId,
        until: Option<Month>,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Transactions with `account` as source or destination dated before `until`
    fn account_transactions(
        &self,
        account: AccountId,
        until: Option<Month>,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Every transaction of a budget dated before `until`
    fn budget_transactions(
        &self,
        budget: BudgetId,
        until: Option<Month>,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Month configs of `envelope` for months before `until`
    fn month_configs(
        &self,
        envelope: EnvelopeId,
        until: Option<Month>,
    ) -> LedgerResult<Vec<MonthConfig>>;

}

/// True if `date` lies before the exclusive month boundary
pub(crate) fn before_boundary(date: chrono::NaiveDate, until: Option<Month>) -> bool {
    until.map_or(true, |until| date < until.start_date())
}

/// In-memory reader fixtures for engine tests
#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use crate::error::LedgerError;

    #[derive(Default)]
    pub struct MemoryLedger {
        pub budgets: Vec<Budget>,
        pub accounts: Vec<Account>,
        pub categories: Vec<Category>,
        pub envelopes: Vec<Envelope>,
        pub transactions: Vec<Transaction>,
        pub configs: Vec<MonthConfig>,
        /// Every fetch fails with a storage error when set
        pub offline: bool,
    }

    impl MemoryLedger {
        fn check(&self) -> LedgerResult<()> {
            if self.offline {
                Err(LedgerError::Storage("connection lost".into()))
            } else {
                Ok(())
            }
        }

        fn live_transactions(
            &self,
            until: Option<Month>,
            keep: impl Fn(&Transaction) -> bool,
        ) -> LedgerResult<Vec<Transaction>> {
            self.check()?;
            Ok(self
                .transactions
                .iter()
                .filter(|t| !t.is_deleted() && before_boundary(t.date, until) && keep(t))
                .cloned()
                .collect())
        }
    }

    impl LedgerReader for MemoryLedger {
        fn budget(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
            self.check()?;
            Ok(self.budgets.iter().find(|b| b.id == id).cloned())
        }

        fn account(&self, id: AccountId) -> LedgerResult<Option<Account>> {
            self.check()?;
            Ok(self
                .accounts
                .iter()
                .find(|a| a.id == id && !a.is_deleted())
                .cloned())
        }

        fn account_including_deleted(&self, id: AccountId) -> LedgerResult<Option<Account>> {
            self.check()?;
            Ok(self.accounts.iter().find(|a| a.id == id).cloned())
        }

        fn envelope(&self, id: EnvelopeId) -> LedgerResult<Option<Envelope>> {
            self.check()?;
            Ok(self.envelopes.iter().find(|e| e.id == id).cloned())
        }

        fn budget_accounts(&self, budget: BudgetId) -> LedgerResult<Vec<Account>> {
            self.check()?;
            Ok(self
                .accounts
                .iter()
                .filter(|a| a.budget_id == budget && !a.is_deleted())
                .cloned()
                .collect())
        }

        fn budget_categories(&self, budget: BudgetId) -> LedgerResult<Vec<Category>> {
            self.check()?;
            Ok(self
                .categories
                .iter()
                .filter(|c| c.budget_id == budget)
                .cloned()
                .collect())
        }

        fn category_envelopes(&self, category: CategoryId) -> LedgerResult<Vec<Envelope>> {
            self.check()?;
            Ok(self
                .envelopes
                .iter()
                .filter(|e| e.category_id == category)
                .cloned()
                .collect())
        }

        fn envelope_transactions(
            &self,
            envelope: EnvelopeId,
            until: Option<Month>,
        ) -> LedgerResult<Vec<Transaction>> {
            self.live_transactions(until, |t| t.envelope_id == Some(envelope))
        }

        fn account_transactions(
            &self,
            account: AccountId,
            until: Option<Month>,
        ) -> LedgerResult<Vec<Transaction>> {
            self.live_transactions(until, |t| {
                t.source_account_id == account || t.destination_account_id == account
            })
        }

        fn budget_transactions(
            &self,
            budget: BudgetId,
            until: Option<Month>,
        ) -> LedgerResult<Vec<Transaction>> {
            self.live_transactions(until, |t| t.budget_id == budget)
        }

        fn month_configs(
            &self,
            envelope: EnvelopeId,
            until: Option<Month>,
        ) -> LedgerResult<Vec<MonthConfig>> {
            self.check()?;
            Ok(self
                .configs
                .iter()
                .filter(|c| c.envelope_id == envelope && !c.is_deleted())
                .filter(|c| until.map_or(true, |until| c.month < until))
                .cloned()
                .collect())
        }
    }
}
