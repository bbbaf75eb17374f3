//! Core data models for envelope-ledger
//!
//! Budgets contain accounts and categories; categories contain envelopes.
//! Month configs and transactions are the records the ledger engine reads.

pub mod account;
pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod month;
pub mod month_config;
pub mod summary;
pub mod transaction;

pub use account::Account;
pub use budget::Budget;
pub use category::{Category, DefaultCategory, Envelope};
pub use ids::{AccountId, BudgetId, CategoryId, EnvelopeId, MonthConfigId, TransactionId};
pub use money::Money;
pub use month::{Month, MonthRange};
pub use month_config::{MonthConfig, OverspendMode};
pub use summary::{AccountBalance, BudgetMonth, CategoryMonth, EnvelopeMonth};
pub use transaction::{Flow, Transaction};
