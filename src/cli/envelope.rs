//! Envelope CLI commands
//!
//! Envelope management, monthly allocations and rolled-over balances.

use clap::Subcommand;

use super::{parse_money, parse_month, resolve_budget};
use crate::config::settings::Settings;
use crate::display::format_envelope_month;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Envelope, OverspendMode};
use crate::services::{CategoryService, EnvelopeService, MonthConfigUpdate};
use crate::storage::Storage;

/// Envelope subcommands
#[derive(Subcommand)]
pub enum EnvelopeCommands {
    /// Create a new envelope in a category
    Create {
        /// Envelope name
        name: String,
        /// Category name or ID
        #[arg(short, long)]
        category: String,
    },
    /// Show the rolled-over balance of an envelope
    Balance {
        /// Envelope name or ID
        envelope: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Show allocation, spending and balance of an envelope for a month
    Month {
        /// Envelope name or ID
        envelope: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Set the allocation of an envelope for a month
    Allocate {
        /// Envelope name or ID
        envelope: String,
        /// Amount (e.g., "100" or "100.00")
        amount: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Overspend handling (affect-available, affect-envelope)
        #[arg(long)]
        overspend: Option<String>,
        /// Note for this month
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Remove the allocation and settings of an envelope for a month
    Reset {
        /// Envelope name or ID
        envelope: String,
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Rename an envelope
    Rename {
        /// Envelope name or ID
        envelope: String,
        /// New name
        name: String,
    },
    /// Delete an envelope
    Delete {
        /// Envelope name or ID
        envelope: String,
    },
}

/// Handle an envelope command
pub fn handle_envelope_command(
    storage: &Storage,
    settings: &Settings,
    budget: Option<&str>,
    cmd: EnvelopeCommands,
) -> LedgerResult<()> {
    let budget = resolve_budget(storage, settings, budget)?;
    let service = EnvelopeService::new(storage);

    let find = |identifier: &str| -> LedgerResult<Envelope> {
        service
            .find(budget.id, identifier)?
            .ok_or_else(|| LedgerError::envelope_not_found(identifier))
    };

    match cmd {
        EnvelopeCommands::Create { name, category } => {
            let category = CategoryService::new(storage)
                .find(budget.id, &category)?
                .ok_or_else(|| LedgerError::category_not_found(&category))?;
            let envelope = service.create(category.id, &name)?;
            println!("Created envelope: {} (in {})", envelope.name, category.name);
            println!("  ID: {}", envelope.id);
        }

        EnvelopeCommands::Balance { envelope, month } => {
            let envelope = find(&envelope)?;
            let month = parse_month(month.as_deref())?;
            let balance = service.balance(envelope.id, month)?;
            println!(
                "{} ({}): {}",
                envelope.name,
                month,
                balance.format_with_symbol(&budget.currency)
            );
        }

        EnvelopeCommands::Month { envelope, month } => {
            let envelope = find(&envelope)?;
            let month = parse_month(month.as_deref())?;
            let summary = service.month_of(&envelope, month)?;
            print!("{}", format_envelope_month(&summary, &budget.currency));
        }

        EnvelopeCommands::Allocate {
            envelope,
            amount,
            month,
            overspend,
            note,
        } => {
            let envelope = find(&envelope)?;
            let month = parse_month(month.as_deref())?;
            let overspend_mode = overspend
                .map(|mode| {
                    OverspendMode::parse(&mode).ok_or_else(|| {
                        LedgerError::Validation(format!(
                            "Invalid overspend mode: '{}'. Valid modes: affect-available, affect-envelope",
                            mode
                        ))
                    })
                })
                .transpose()?;

            let config = service.set_month_config(
                envelope.id,
                month,
                MonthConfigUpdate {
                    allocation: Some(parse_money(&amount)?),
                    overspend_mode,
                    note,
                },
            )?;

            println!(
                "Allocated {} to {} for {} ({})",
                config.allocation.format_with_symbol(&budget.currency),
                envelope.name,
                month,
                config.overspend_mode
            );
        }

        EnvelopeCommands::Reset { envelope, month } => {
            let envelope = find(&envelope)?;
            let month = parse_month(month.as_deref())?;
            match service.delete_month_config(envelope.id, month)? {
                Some(_) => println!("Reset {} for {}", envelope.name, month),
                None => println!("{} has no settings for {}", envelope.name, month),
            }
        }

        EnvelopeCommands::Rename { envelope, name } => {
            let found = find(&envelope)?;
            let renamed = service.rename(found.id, &name)?;
            println!("Renamed envelope '{}' to '{}'", found.name, renamed.name);
        }

        EnvelopeCommands::Delete { envelope } => {
            let found = find(&envelope)?;
            service.delete(found.id)?;
            println!("Deleted envelope: {}", found.name);
        }
    }

    Ok(())
}
