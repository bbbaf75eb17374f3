//! Budget CLI commands
//!
//! Implements CLI commands for budget management, the monthly overview and
//! bulk allocation.

use clap::Subcommand;

use super::{parse_month, resolve_budget};
use crate::config::settings::Settings;
use crate::display::format_budget_month;
use crate::error::{LedgerError, LedgerResult};
use crate::services::{AllocationMode, BudgetService};
use crate::storage::{create_budget_with_defaults, Storage};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a new budget with the default categories
    Create {
        /// Budget name
        name: String,
        /// Currency symbol, defaults to the configured one
        #[arg(short, long)]
        currency: Option<String>,
        /// Create the budget without default categories
        #[arg(long)]
        empty: bool,
    },
    /// List budgets
    List,
    /// Show the budget overview for a month
    Show {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Make a budget the default for later commands
    Use {
        /// Budget name or ID
        budget: String,
    },
    /// Rename the selected budget
    Rename {
        /// New name
        name: String,
    },
    /// Delete the selected budget
    Delete,
    /// Set every envelope's allocation from the previous month
    Allocate {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Source of the amounts (last-month-budget, last-month-spend)
        #[arg(long, default_value = "last-month-budget")]
        mode: String,
    },
    /// Zero every envelope's allocation for a month
    Clear {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &mut Settings,
    budget: Option<&str>,
    cmd: BudgetCommands,
) -> LedgerResult<()> {
    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::Create {
            name,
            currency,
            empty,
        } => {
            let currency = currency.unwrap_or_else(|| settings.currency_symbol.clone());
            let created = if empty {
                service.create(&name, &currency)?
            } else {
                create_budget_with_defaults(storage, &name, &currency)?
            };
            println!("Created budget: {}", created.name);
            println!("  Currency: {}", created.currency);
            println!("  ID: {}", created.id);
        }

        BudgetCommands::List => {
            let budgets = service.list()?;
            if budgets.is_empty() {
                println!("No budgets found.");
            }
            for b in budgets {
                let marker = if settings.default_budget == Some(b.id) {
                    "*"
                } else {
                    " "
                };
                println!("{} {}  [{}]", marker, b.name, b.id.short());
            }
        }

        BudgetCommands::Show { month } => {
            let selected = resolve_budget(storage, settings, budget)?;
            let month = parse_month(month.as_deref())?;
            let overview = service.month(selected.id, month)?;
            println!("{}", selected.name);
            print!("{}", format_budget_month(&overview, &selected.currency));
        }

        BudgetCommands::Use { budget } => {
            let selected = service
                .find(&budget)?
                .ok_or_else(|| LedgerError::budget_not_found(&budget))?;
            settings.default_budget = Some(selected.id);
            settings.save(storage.paths())?;
            println!("Default budget: {}", selected.name);
        }

        BudgetCommands::Rename { name } => {
            let selected = resolve_budget(storage, settings, budget)?;
            let renamed = service.rename(selected.id, &name)?;
            println!("Renamed budget '{}' to '{}'", selected.name, renamed.name);
        }

        BudgetCommands::Delete => {
            let selected = resolve_budget(storage, settings, budget)?;
            service.delete(selected.id)?;
            if settings.default_budget == Some(selected.id) {
                settings.default_budget = None;
                settings.save(storage.paths())?;
            }
            println!("Deleted budget: {}", selected.name);
        }

        BudgetCommands::Allocate { month, mode } => {
            let selected = resolve_budget(storage, settings, budget)?;
            let month = parse_month(month.as_deref())?;
            let mode = AllocationMode::parse(&mode).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Invalid allocation mode: '{}'. Valid modes: last-month-budget, last-month-spend",
                    mode
                ))
            })?;

            let configs = service.set_allocations(selected.id, month, mode)?;
            println!(
                "Set allocations for {} envelope(s) in {}",
                configs.len(),
                month
            );
        }

        BudgetCommands::Clear { month } => {
            let selected = resolve_budget(storage, settings, budget)?;
            let month = parse_month(month.as_deref())?;
            let cleared = service.clear_allocations(selected.id, month)?;
            println!("Cleared {} allocation(s) in {}", cleared, month);
        }
    }

    Ok(())
}
