//! Category CLI commands

use clap::Subcommand;

use super::resolve_budget;
use crate::config::settings::Settings;
use crate::display::format_category_tree;
use crate::error::{LedgerError, LedgerResult};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a new category
    Create {
        /// Category name
        name: String,
    },
    /// List categories and their envelopes
    List,
    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },
    /// Delete a category and hide its envelopes
    Delete {
        /// Category name or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    settings: &Settings,
    budget: Option<&str>,
    cmd: CategoryCommands,
) -> LedgerResult<()> {
    let budget = resolve_budget(storage, settings, budget)?;
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::Create { name } => {
            let category = service.create(budget.id, &name)?;
            println!("Created category: {}", category.name);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::List => {
            let categories = service.list_with_envelopes(budget.id)?;
            print!("{}", format_category_tree(&categories));
        }

        CategoryCommands::Rename { category, name } => {
            let found = service
                .find(budget.id, &category)?
                .ok_or_else(|| LedgerError::category_not_found(&category))?;
            let renamed = service.rename(found.id, &name)?;
            println!("Renamed category '{}' to '{}'", found.name, renamed.name);
        }

        CategoryCommands::Delete { category } => {
            let found = service
                .find(budget.id, &category)?
                .ok_or_else(|| LedgerError::category_not_found(&category))?;
            service.delete(found.id)?;
            println!("Deleted category: {}", found.name);
        }
    }

    Ok(())
}
