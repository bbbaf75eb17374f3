//! Category service
//!
//! Category management on top of [`Storage`]: create, rename, delete and
//! listing categories together with their envelopes.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{BudgetId, Category, CategoryId, Envelope};
use crate::storage::Storage;

pub struct CategoryService<'a> {
    storage: &'a Storage,
}

/// A category with its live envelopes
#[derive(Debug, Clone)]
pub struct CategoryWithEnvelopes {
    pub category: Category,
    pub envelopes: Vec<Envelope>,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, budget_id: BudgetId, name: &str) -> LedgerResult<Category> {
        let name = name.trim();

        if self.storage.budgets.get_budget(budget_id)?.is_none() {
            return Err(LedgerError::budget_not_found(budget_id.to_string()));
        }

        if self
            .storage
            .budgets
            .get_category_by_name(budget_id, name)?
            .is_some()
        {
            return Err(LedgerError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let categories = self.storage.budgets.get_categories(budget_id)?;
        let max_order = categories.iter().map(|c| c.sort_order).max().unwrap_or(-1);
        let category = Category::with_sort_order(budget_id, name, max_order + 1);

        category
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.budgets.upsert_category(category.clone())?;
        self.storage.budgets.save()?;
        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        info!(category = %category.id, name = %category.name, "created category");
        Ok(category)
    }

    /// Find a live category by name or ID string
    pub fn find(&self, budget_id: BudgetId, identifier: &str) -> LedgerResult<Option<Category>> {
        if let Some(category) = self.storage.budgets.get_category_by_name(budget_id, identifier)? {
            return Ok(Some(category));
        }

        match identifier.parse::<CategoryId>() {
            Ok(id) => Ok(self
                .storage
                .budgets
                .get_category(id)?
                .filter(|c| c.budget_id == budget_id)),
            Err(_) => Ok(None),
        }
    }

    pub fn list_with_envelopes(&self, budget_id: BudgetId) -> LedgerResult<Vec<CategoryWithEnvelopes>> {
        let categories = self.storage.budgets.get_categories(budget_id)?;
        let mut result = Vec::with_capacity(categories.len());

        for category in categories {
            let envelopes = self.storage.budgets.get_envelopes(category.id)?;
            result.push(CategoryWithEnvelopes { category, envelopes });
        }

        Ok(result)
    }

    pub fn rename(&self, id: CategoryId, name: &str) -> LedgerResult<Category> {
        let mut category = self
            .storage
            .budgets
            .get_category(id)?
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))?;
        let before = category.clone();

        let name = name.trim();
        if let Some(existing) = self
            .storage
            .budgets
            .get_category_by_name(category.budget_id, name)?
        {
            if existing.id != id {
                return Err(LedgerError::Duplicate {
                    entity_type: "Category",
                    identifier: name.to_string(),
                });
            }
        }

        category.rename(name);
        category
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.budgets.upsert_category(category.clone())?;
        self.storage.budgets.save()?;
        self.storage.log_update(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &before,
            &category,
        )?;

        Ok(category)
    }

    /// Tombstone a category; its envelopes drop out of every budget read
    pub fn delete(&self, id: CategoryId) -> LedgerResult<Category> {
        let mut category = self
            .storage
            .budgets
            .get_category(id)?
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))?;

        category.mark_deleted();
        self.storage.budgets.upsert_category(category.clone())?;
        self.storage.budgets.save()?;
        self.storage.log_delete(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        info!(category = %category.id, "deleted category");
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::Budget;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage, BudgetId) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(LedgerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let budget = Budget::new("Home");
        storage.budgets.upsert_budget(budget.clone()).unwrap();
        (temp_dir, storage, budget.id)
    }

    #[test]
    fn test_create_appends_sort_order() {
        let (_temp_dir, storage, budget) = create_test_storage();
        let service = CategoryService::new(&storage);

        let first = service.create(budget, "Bills").unwrap();
        let second = service.create(budget, "Fun").unwrap();

        assert_eq!(first.sort_order, 0);
        assert_eq!(second.sort_order, 1);
        assert!(service.create(budget, "bills").is_err());
    }

    #[test]
    fn test_create_in_unknown_budget() {
        let (_temp_dir, storage, _budget) = create_test_storage();
        let err = CategoryService::new(&storage)
            .create(BudgetId::new(), "Bills")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rename_and_delete() {
        let (_temp_dir, storage, budget) = create_test_storage();
        let service = CategoryService::new(&storage);
        let category = service.create(budget, "Bills").unwrap();
        storage
            .budgets
            .upsert_envelope(Envelope::new(category.id, "Rent"))
            .unwrap();

        service.rename(category.id, "Fixed Costs").unwrap();
        assert!(service.find(budget, "fixed costs").unwrap().is_some());
        assert_eq!(service.list_with_envelopes(budget).unwrap()[0].envelopes.len(), 1);

        service.delete(category.id).unwrap();
        assert!(service.list_with_envelopes(budget).unwrap().is_empty());
        assert_eq!(storage.audit().read_all().unwrap().len(), 3);
    }
}
