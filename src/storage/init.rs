//! Storage initialization
//!
//! First-run setup: directories plus a starter budget with the default
//! categories and envelopes.

use tracing::info;

use crate::audit::EntityType;
use crate::config::paths::LedgerPaths;
use crate::config::settings::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, Category, DefaultCategory, Envelope};

use super::Storage;

/// Create the data directories and, when no budget exists yet, a default
/// budget that becomes the settings' default
pub fn initialize_storage(paths: &LedgerPaths, settings: &mut Settings) -> LedgerResult<Storage> {
    paths.ensure_directories()?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    if storage.budgets.get_all_budgets()?.is_empty() {
        let budget = create_budget_with_defaults(&storage, "My Budget", &settings.currency_symbol)?;
        settings.default_budget = Some(budget.id);
    }

    settings.save(paths)?;
    Ok(storage)
}

/// Create a budget populated with the starter categories and envelopes
pub fn create_budget_with_defaults(
    storage: &Storage,
    name: &str,
    currency_symbol: &str,
) -> LedgerResult<Budget> {
    let name = name.trim();
    if storage.budgets.get_budget_by_name(name)?.is_some() {
        return Err(LedgerError::Duplicate {
            entity_type: "Budget",
            identifier: name.to_string(),
        });
    }

    let budget = Budget::new(name).with_currency(currency_symbol);
    budget
        .validate()
        .map_err(|e| LedgerError::Validation(e.to_string()))?;

    storage.budgets.upsert_budget(budget.clone())?;

    for (i, default) in DefaultCategory::all().iter().enumerate() {
        let category = Category::with_sort_order(budget.id, default.name(), i as i32);
        for (j, envelope_name) in default.envelope_names().iter().enumerate() {
            let mut envelope = Envelope::new(category.id, *envelope_name);
            envelope.sort_order = j as i32;
            storage.budgets.upsert_envelope(envelope)?;
        }
        storage.budgets.upsert_category(category)?;
    }

    storage.budgets.save()?;
    storage.log_create(
        EntityType::Budget,
        budget.id.to_string(),
        Some(budget.name.clone()),
        &budget,
    )?;

    info!(budget = %budget.id, name = %budget.name, "created budget with default envelopes");
    Ok(budget)
}
