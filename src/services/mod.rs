//! Service layer for envelope-ledger
//!
//! The read side (`AccountService`, `EnvelopeService`, `BudgetService`) works
//! over any [`crate::ledger::LedgerReader`]. Write operations are available
//! when a service wraps [`crate::storage::Storage`].

pub mod account;
pub mod budget;
pub mod category;
pub mod envelope;
pub mod rollover;
pub mod transaction;

pub use account::{AccountKind, AccountService};
pub use budget::{AllocationMode, BudgetService};
pub use category::{CategoryService, CategoryWithEnvelopes};
pub use envelope::{EnvelopeService, MonthConfigUpdate};
pub use rollover::EnvelopeHistory;
pub use transaction::{
    CreateTransactionInput, TransactionFilter, TransactionService, UpdateTransactionInput,
};
