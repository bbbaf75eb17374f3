//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod budget;
pub mod category;
pub mod envelope;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use envelope::{handle_envelope_command, EnvelopeCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::NaiveDate;

use crate::config::settings::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, Money, Month};
use crate::services::BudgetService;
use crate::storage::Storage;

/// Resolve the budget a command works on
///
/// An explicit `--budget` wins, then the configured default, then the
/// first budget on file.
pub fn resolve_budget(
    storage: &Storage,
    settings: &Settings,
    identifier: Option<&str>,
) -> LedgerResult<Budget> {
    let service = BudgetService::new(storage);

    if let Some(identifier) = identifier {
        return service
            .find(identifier)?
            .ok_or_else(|| LedgerError::budget_not_found(identifier));
    }

    if let Some(id) = settings.default_budget {
        if let Some(budget) = storage.budgets.get_budget(id)? {
            return Ok(budget);
        }
    }

    service.list()?.into_iter().next().ok_or_else(|| {
        LedgerError::Config("No budget found. Run 'envelope-ledger init' first.".into())
    })
}

/// Parse an optional `YYYY-MM` argument, defaulting to the current month
pub fn parse_month(value: Option<&str>) -> LedgerResult<Month> {
    match value {
        None => Ok(Month::current()),
        Some(s) => Month::parse(s)
            .map_err(|e| LedgerError::Validation(format!("Invalid month '{}': {}", s, e))),
    }
}

pub fn parse_money(value: &str) -> LedgerResult<Money> {
    Money::parse(value).map_err(|e| {
        LedgerError::Validation(format!(
            "Invalid amount: '{}'. Use format like '100.00' or '100'. Error: {}",
            value, e
        ))
    })
}

/// Parse a `YYYY-MM-DD` date, defaulting to today
pub fn parse_date(value: Option<&str>) -> LedgerResult<NaiveDate> {
    match value {
        None => Ok(chrono::Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            LedgerError::Validation(format!("Invalid date: '{}'. Use YYYY-MM-DD.", s))
        }),
    }
}
