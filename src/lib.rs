//! envelope-ledger - envelope budgeting with a month-rollover ledger
//!
//! Money lives in accounts; envelopes track what it is meant for. Every
//! figure is derived from the ledger of transactions and monthly envelope
//! allocations, so nothing but those records is ever stored.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (budgets, accounts, envelopes, transactions)
//! - `ledger`: The read interface the balance calculations run against
//! - `storage`: JSON file storage layer
//! - `services`: Balance calculations, rollover and the write operations
//! - `audit`: Audit logging system
//! - `display`: Terminal tables
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use envelope_ledger::config::{LedgerPaths, Settings};
//! use envelope_ledger::models::Month;
//! use envelope_ledger::services::BudgetService;
//! use envelope_ledger::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let budget = settings.default_budget.unwrap();
//! let month = BudgetService::new(&storage).month(budget, Month::current())?;
//! println!("available: {}", month.available);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod ledger;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
