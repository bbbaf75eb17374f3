//! Account model
//!
//! Accounts are either on-budget (tracked inside the budget's totals),
//! off-budget, or external. External accounts stand for counterparties such
//! as employers or stores and are never on-budget.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, BudgetId};
use super::money::Money;

/// A financial account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    pub budget_id: BudgetId,

    pub name: String,

    #[serde(default)]
    pub note: String,

    /// Whether this account participates in budget totals
    pub on_budget: bool,

    /// Whether this account is a counterparty outside the budget
    pub external: bool,

    /// Balance the account had before any recorded transaction
    #[serde(default)]
    pub initial_balance: Money,

    /// Date the initial balance applies from
    #[serde(default)]
    pub initial_balance_date: Option<NaiveDate>,

    /// Hidden accounts are still counted, only omitted from listings
    #[serde(default)]
    pub hidden: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Tombstone; set when the account is removed
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Create a new on-budget account
    pub fn new(budget_id: BudgetId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            budget_id,
            name: name.into(),
            note: String::new(),
            on_budget: true,
            external: false,
            initial_balance: Money::ZERO,
            initial_balance_date: None,
            hidden: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Create an external counterparty account
    pub fn external(budget_id: BudgetId, name: impl Into<String>) -> Self {
        let mut account = Self::new(budget_id, name);
        account.on_budget = false;
        account.external = true;
        account
    }

    /// Create an internal account that is not part of the budget (e.g. a brokerage)
    pub fn off_budget(budget_id: BudgetId, name: impl Into<String>) -> Self {
        let mut account = Self::new(budget_id, name);
        account.on_budget = false;
        account
    }

    pub fn with_initial_balance(mut self, amount: Money, date: Option<NaiveDate>) -> Self {
        self.initial_balance = amount;
        self.initial_balance_date = date;
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(AccountValidationError::NameTooLong(self.name.len()));
        }

        if self.external && self.on_budget {
            return Err(AccountValidationError::ExternalOnBudget);
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.external {
            "external"
        } else if self.on_budget {
            "on-budget"
        } else {
            "off-budget"
        };
        write!(f, "{} ({})", self.name, kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    #[error("Account name cannot be empty")]
    EmptyName,
    #[error("Account name too long ({0} chars, max 100)")]
    NameTooLong(usize),
    #[error("External accounts cannot be on-budget")]
    ExternalOnBudget,
}
