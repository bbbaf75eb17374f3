//! Computed monthly summaries
//!
//! These are results of the ledger calculations, never persisted.

use serde::Serialize;
use std::fmt;

use super::ids::{AccountId, BudgetId, CategoryId, EnvelopeId, MonthConfigId};
use super::money::Money;
use super::month::Month;

/// Balance of one account as of a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    pub account_id: AccountId,
    /// Raw balance including income that is not yet available
    pub balance: Money,
    /// Balance usable for budgeting in the requested month
    pub available: Money,
}

/// One envelope's figures for a month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeMonth {
    pub envelope_id: EnvelopeId,
    pub name: String,
    pub month: Month,
    /// Net money spent this month; positive means spending
    pub spent: Money,
    /// Envelope balance after this month's rollover
    pub balance: Money,
    pub allocation: Money,
    /// Record holding the allocation, if one exists
    pub allocation_id: Option<MonthConfigId>,
}

impl EnvelopeMonth {
    pub fn is_overspent(&self) -> bool {
        self.balance.is_negative()
    }
}

impl fmt::Display for EnvelopeMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Allocated: {} | Spent: {} | Balance: {}",
            self.allocation, self.spent, self.balance
        )
    }
}

/// Envelope totals for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMonth {
    pub category_id: CategoryId,
    pub name: String,
    pub balance: Money,
    pub spent: Money,
    pub allocation: Money,
    pub envelopes: Vec<EnvelopeMonth>,
}

impl CategoryMonth {
    pub fn new(category_id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            category_id,
            name: name.into(),
            balance: Money::ZERO,
            spent: Money::ZERO,
            allocation: Money::ZERO,
            envelopes: Vec::new(),
        }
    }

    pub fn push(&mut self, envelope: EnvelopeMonth) {
        self.balance += envelope.balance;
        self.spent += envelope.spent;
        self.allocation += envelope.allocation;
        self.envelopes.push(envelope);
    }
}

/// Budget-wide figures for a month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetMonth {
    pub budget_id: BudgetId,
    pub month: Month,
    /// Income becoming available this month
    pub income: Money,
    /// Sum of every envelope allocation this month
    pub allocated: Money,
    pub balance: Money,
    pub spent: Money,
    /// Money in on-budget accounts not claimed by any envelope
    pub available: Money,
    pub categories: Vec<CategoryMonth>,
}

impl BudgetMonth {
    /// Envelopes with a negative balance
    pub fn overspent(&self) -> impl Iterator<Item = &EnvelopeMonth> {
        self.categories
            .iter()
            .flat_map(|c| c.envelopes.iter())
            .filter(|e| e.is_overspent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(balance: i64, spent: i64, allocation: i64) -> EnvelopeMonth {
        EnvelopeMonth {
            envelope_id: EnvelopeId::new(),
            name: "Groceries".into(),
            month: Month::new(2025, 1),
            spent: Money::from_cents(spent),
            balance: Money::from_cents(balance),
            allocation: Money::from_cents(allocation),
            allocation_id: None,
        }
    }

    #[test]
    fn test_category_accumulates() {
        let mut category = CategoryMonth::new(CategoryId::new(), "Needs");
        category.push(envelope(5000, 1000, 6000));
        category.push(envelope(-3000, 8000, 5000));

        assert_eq!(category.balance, Money::from_cents(2000));
        assert_eq!(category.spent, Money::from_cents(9000));
        assert_eq!(category.allocation, Money::from_cents(11000));
        assert_eq!(category.envelopes.len(), 2);
    }

    #[test]
    fn test_overspent_filter() {
        let mut category = CategoryMonth::new(CategoryId::new(), "Needs");
        category.push(envelope(5000, 0, 5000));
        category.push(envelope(-1, 1, 0));
        let month = BudgetMonth {
            budget_id: BudgetId::new(),
            month: Month::new(2025, 1),
            income: Money::ZERO,
            allocated: Money::ZERO,
            balance: category.balance,
            spent: category.spent,
            available: Money::ZERO,
            categories: vec![category],
        };
        assert_eq!(month.overspent().count(), 1);
    }
}
