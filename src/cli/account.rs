//! Account CLI commands
//!
//! Implements CLI commands for account management and balances.

use clap::Subcommand;

use super::{parse_date, parse_money, parse_month, resolve_budget};
use crate::config::settings::Settings;
use crate::display::account::{format_account_balance, format_account_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Money};
use crate::services::{AccountKind, AccountService};
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Account kind (on-budget, off-budget, external)
        #[arg(short, long, default_value = "on-budget")]
        kind: String,
        /// Opening balance (e.g., "1000.00" or "1000")
        #[arg(short, long, default_value = "0")]
        balance: String,
        /// Date of the opening balance (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List accounts with balances
    List {
        /// Balances as of the end of this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Show the balance of one account
    Balance {
        /// Account name or ID
        account: String,
        /// Balance as of the end of this month (YYYY-MM); all time if omitted
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Rename an account
    Rename {
        /// Account name or ID
        account: String,
        /// New name
        name: String,
    },
    /// Delete an account
    Delete {
        /// Account name or ID
        account: String,
    },
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    budget: Option<&str>,
    cmd: AccountCommands,
) -> LedgerResult<()> {
    let budget = resolve_budget(storage, settings, budget)?;
    let service = AccountService::new(storage);

    let find = |identifier: &str| -> LedgerResult<Account> {
        service
            .find(budget.id, identifier)?
            .ok_or_else(|| LedgerError::account_not_found(identifier))
    };

    match cmd {
        AccountCommands::Create {
            name,
            kind,
            balance,
            date,
        } => {
            let kind = AccountKind::parse(&kind).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Invalid account kind: '{}'. Valid kinds: on-budget, off-budget, external",
                    kind
                ))
            })?;
            let initial_balance = parse_money(&balance)?;
            let initial_date = match date {
                Some(d) => Some(parse_date(Some(&d))?),
                None if initial_balance != Money::ZERO => Some(parse_date(None)?),
                None => None,
            };

            let account = service.create(budget.id, &name, kind, initial_balance, initial_date)?;

            println!("Created account: {}", account.name);
            println!(
                "  Opening Balance: {}",
                account.initial_balance.format_with_symbol(&budget.currency)
            );
            println!(
                "  On Budget: {}",
                if account.on_budget { "Yes" } else { "No" }
            );
            println!("  ID: {}", account.id);
        }

        AccountCommands::List { month } => {
            let upper = month.as_deref().map(|m| parse_month(Some(m))).transpose()?;
            let accounts = service.list_with_balances(budget.id, upper)?;
            print!("{}", format_account_list(&accounts, &budget.currency));
        }

        AccountCommands::Balance { account, month } => {
            let account = find(&account)?;
            let upper = month.as_deref().map(|m| parse_month(Some(m))).transpose()?;
            let balance = service.balance_of(&account, upper)?;
            print!("{}", format_account_balance(&account, &balance, &budget.currency));
        }

        AccountCommands::Rename { account, name } => {
            let found = find(&account)?;
            let renamed = service.rename(found.id, &name)?;
            println!("Renamed account '{}' to '{}'", found.name, renamed.name);
        }

        AccountCommands::Delete { account } => {
            let found = find(&account)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted account: {}", deleted.name);
        }
    }

    Ok(())
}
