//! Transaction model
//!
//! A transaction moves a strictly positive amount from a source account to a
//! destination account. Spending and refunds carry an envelope; transfers
//! between two on-budget accounts never do.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::account::Account;
use super::ids::{AccountId, BudgetId, EnvelopeId, TransactionId};
use super::money::Money;
use super::month::Month;

/// Direction of a transaction relative to one account or envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub budget_id: BudgetId,

    pub source_account_id: AccountId,

    pub destination_account_id: AccountId,

    /// Envelope the money is spent from or refunded to
    #[serde(default)]
    pub envelope_id: Option<EnvelopeId>,

    /// Always strictly positive
    pub amount: Money,

    pub date: NaiveDate,

    /// Month from which incoming money can be budgeted
    pub available_from: Month,

    #[serde(default)]
    pub note: String,

    #[serde(default)]
    pub reconciled_source: bool,

    #[serde(default)]
    pub reconciled_destination: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a transaction whose money is available in the month of `date`
    pub fn new(
        budget_id: BudgetId,
        source_account_id: AccountId,
        destination_account_id: AccountId,
        date: NaiveDate,
        amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            budget_id,
            source_account_id,
            destination_account_id,
            envelope_id: None,
            amount,
            date,
            available_from: Month::of(date),
            note: String::new(),
            reconciled_source: false,
            reconciled_destination: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_envelope(mut self, envelope_id: EnvelopeId) -> Self {
        self.envelope_id = Some(envelope_id);
        self
    }

    pub fn available_from(mut self, month: Month) -> Self {
        self.available_from = month;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Month of the transaction's own date
    pub fn month(&self) -> Month {
        Month::of(self.date)
    }

    /// Direction relative to `account`, or `None` if it is not involved
    pub fn flow_for_account(&self, account: AccountId) -> Option<Flow> {
        if self.destination_account_id == account {
            Some(Flow::Incoming)
        } else if self.source_account_id == account {
            Some(Flow::Outgoing)
        } else {
            None
        }
    }

    /// Signed effect on `account`: positive for incoming, negative for outgoing
    pub fn signed_for_account(&self, account: AccountId) -> Money {
        match self.flow_for_account(account) {
            Some(Flow::Incoming) => self.amount,
            Some(Flow::Outgoing) => -self.amount,
            None => Money::ZERO,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Check the invariants that do not need the accounts themselves
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }

        if self.source_account_id == self.destination_account_id {
            return Err(TransactionValidationError::SameAccount);
        }

        if self.available_from < self.month() {
            return Err(TransactionValidationError::AvailableBeforeDate {
                available_from: self.available_from,
                month: self.month(),
            });
        }

        Ok(())
    }

    /// Check every invariant, including the on-budget/envelope combination
    pub fn validate_with_accounts(
        &self,
        source: &Account,
        destination: &Account,
    ) -> Result<(), TransactionValidationError> {
        self.validate()?;

        if source.id != self.source_account_id || destination.id != self.destination_account_id {
            return Err(TransactionValidationError::AccountMismatch);
        }

        if source.budget_id != self.budget_id || destination.budget_id != self.budget_id {
            return Err(TransactionValidationError::ForeignAccount);
        }

        if !source.on_budget && !destination.on_budget {
            return Err(TransactionValidationError::NoOnBudgetAccount);
        }

        if source.on_budget && destination.on_budget && self.envelope_id.is_some() {
            return Err(TransactionValidationError::TransferWithEnvelope);
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.amount)?;
        if !self.note.is_empty() {
            write!(f, " {}", self.note)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionValidationError {
    #[error("Transaction amount must be positive, got {0}")]
    NonPositiveAmount(Money),
    #[error("Source and destination account must differ")]
    SameAccount,
    #[error("Money cannot be available ({available_from}) before the transaction month ({month})")]
    AvailableBeforeDate { available_from: Month, month: Month },
    #[error("Accounts do not match the transaction")]
    AccountMismatch,
    #[error("Both accounts must belong to the transaction's budget")]
    ForeignAccount,
    #[error("Transfers between external or off-budget accounts are not allowed")]
    NoOnBudgetAccount,
    #[error("Transfers between on-budget accounts cannot have an envelope")]
    TransferWithEnvelope,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn accounts() -> (Account, Account, Account) {
        let budget = BudgetId::new();
        (
            Account::new(budget, "Checking"),
            Account::new(budget, "Savings"),
            Account::external(budget, "Grocer"),
        )
    }

    #[test]
    fn test_new_defaults_available_from() {
        let (checking, _, grocer) = accounts();
        let txn = Transaction::new(
            checking.budget_id,
            checking.id,
            grocer.id,
            date(2025, 1, 15),
            Money::from_cents(8000),
        );
        assert_eq!(txn.available_from, Month::new(2025, 1));
        assert_eq!(txn.month(), Month::new(2025, 1));
    }

    #[test]
    fn test_flow_for_account() {
        let (checking, savings, grocer) = accounts();
        let txn = Transaction::new(
            checking.budget_id,
            checking.id,
            grocer.id,
            date(2025, 1, 15),
            Money::from_cents(500),
        );
        assert_eq!(txn.flow_for_account(checking.id), Some(Flow::Outgoing));
        assert_eq!(txn.flow_for_account(grocer.id), Some(Flow::Incoming));
        assert_eq!(txn.flow_for_account(savings.id), None);
        assert_eq!(txn.signed_for_account(checking.id), Money::from_cents(-500));
    }

    #[test]
    fn test_basic_validation() {
        let (checking, _, grocer) = accounts();
        let mut txn = Transaction::new(
            checking.budget_id,
            checking.id,
            grocer.id,
            date(2025, 3, 2),
            Money::ZERO,
        );
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::NonPositiveAmount(Money::ZERO))
        );

        txn.amount = Money::from_cents(100);
        txn.available_from = Month::new(2025, 2);
        assert!(matches!(
            txn.validate(),
            Err(TransactionValidationError::AvailableBeforeDate { .. })
        ));

        txn.available_from = Month::new(2025, 4);
        assert!(txn.validate().is_ok());

        txn.destination_account_id = checking.id;
        assert_eq!(txn.validate(), Err(TransactionValidationError::SameAccount));
    }

    #[test]
    fn test_account_rules() {
        let (checking, savings, grocer) = accounts();
        let budget = checking.budget_id;
        let envelope = EnvelopeId::new();

        let transfer = Transaction::new(budget, checking.id, savings.id, date(2025, 1, 1), Money::from_cents(100))
            .with_envelope(envelope);
        assert_eq!(
            transfer.validate_with_accounts(&checking, &savings),
            Err(TransactionValidationError::TransferWithEnvelope)
        );

        let other = Account::external(budget, "Employer");
        let external = Transaction::new(budget, other.id, grocer.id, date(2025, 1, 1), Money::from_cents(100));
        assert_eq!(
            external.validate_with_accounts(&other, &grocer),
            Err(TransactionValidationError::NoOnBudgetAccount)
        );

        let spend = Transaction::new(budget, checking.id, grocer.id, date(2025, 1, 1), Money::from_cents(100))
            .with_envelope(envelope);
        assert!(spend.validate_with_accounts(&checking, &grocer).is_ok());

        let stranger = Account::new(BudgetId::new(), "Elsewhere");
        let foreign = Transaction::new(budget, checking.id, stranger.id, date(2025, 1, 1), Money::from_cents(100));
        assert_eq!(
            foreign.validate_with_accounts(&checking, &stranger),
            Err(TransactionValidationError::ForeignAccount)
        );
    }
}
