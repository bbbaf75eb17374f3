//! Budget, category and envelope repository
//!
//! The three container entities share budget.json.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Budget, BudgetId, Category, CategoryId, Envelope, EnvelopeId};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct BudgetData {
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub envelopes: Vec<Envelope>,
}

pub struct BudgetRepository {
    path: PathBuf,
    budgets: RwLock<HashMap<BudgetId, Budget>>,
    categories: RwLock<HashMap<CategoryId, Category>>,
    envelopes: RwLock<HashMap<EnvelopeId, Envelope>>,
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            budgets: RwLock::new(HashMap::new()),
            categories: RwLock::new(HashMap::new()),
            envelopes: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut budgets = write_lock(&self.budgets)?;
        let mut categories = write_lock(&self.categories)?;
        let mut envelopes = write_lock(&self.envelopes)?;

        budgets.clear();
        categories.clear();
        envelopes.clear();

        budgets.extend(file_data.budgets.into_iter().map(|b| (b.id, b)));
        categories.extend(file_data.categories.into_iter().map(|c| (c.id, c)));
        envelopes.extend(file_data.envelopes.into_iter().map(|e| (e.id, e)));

        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let budgets = read_lock(&self.budgets)?;
        let categories = read_lock(&self.categories)?;
        let envelopes = read_lock(&self.envelopes)?;

        let mut file_data = BudgetData {
            budgets: budgets.values().cloned().collect(),
            categories: categories.values().cloned().collect(),
            envelopes: envelopes.values().cloned().collect(),
        };
        file_data.budgets.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        file_data
            .categories
            .sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        file_data
            .envelopes
            .sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));

        write_json_atomic(&self.path, &file_data)
    }

    // Budgets

    pub fn get_budget(&self, id: BudgetId) -> Result<Option<Budget>, LedgerError> {
        Ok(read_lock(&self.budgets)?
            .get(&id)
            .filter(|b| !b.is_deleted())
            .cloned())
    }

    /// Live budgets, oldest first
    pub fn get_all_budgets(&self) -> Result<Vec<Budget>, LedgerError> {
        let budgets = read_lock(&self.budgets)?;
        let mut list: Vec<_> = budgets.values().filter(|b| !b.is_deleted()).cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }

    pub fn get_budget_by_name(&self, name: &str) -> Result<Option<Budget>, LedgerError> {
        let name_lower = name.to_lowercase();
        Ok(self
            .get_all_budgets()?
            .into_iter()
            .find(|b| b.name.to_lowercase() == name_lower))
    }

    pub fn upsert_budget(&self, budget: Budget) -> Result<(), LedgerError> {
        write_lock(&self.budgets)?.insert(budget.id, budget);
        Ok(())
    }

    // Categories

    pub fn get_category(&self, id: CategoryId) -> Result<Option<Category>, LedgerError> {
        Ok(read_lock(&self.categories)?
            .get(&id)
            .filter(|c| !c.is_deleted())
            .cloned())
    }

    /// Live categories of a budget in display order
    pub fn get_categories(&self, budget_id: BudgetId) -> Result<Vec<Category>, LedgerError> {
        let categories = read_lock(&self.categories)?;
        let mut list: Vec<_> = categories
            .values()
            .filter(|c| c.budget_id == budget_id && !c.is_deleted())
            .cloned()
            .collect();
        list.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        Ok(list)
    }

    pub fn get_category_by_name(
        &self,
        budget_id: BudgetId,
        name: &str,
    ) -> Result<Option<Category>, LedgerError> {
        let name_lower = name.to_lowercase();
        Ok(self
            .get_categories(budget_id)?
            .into_iter()
            .find(|c| c.name.to_lowercase() == name_lower))
    }

    pub fn upsert_category(&self, category: Category) -> Result<(), LedgerError> {
        write_lock(&self.categories)?.insert(category.id, category);
        Ok(())
    }

    // Envelopes

    pub fn get_envelope(&self, id: EnvelopeId) -> Result<Option<Envelope>, LedgerError> {
        Ok(read_lock(&self.envelopes)?
            .get(&id)
            .filter(|e| !e.is_deleted())
            .cloned())
    }

    /// Live envelopes of a category in display order
    pub fn get_envelopes(&self, category_id: CategoryId) -> Result<Vec<Envelope>, LedgerError> {
        let envelopes = read_lock(&self.envelopes)?;
        let mut list: Vec<_> = envelopes
            .values()
            .filter(|e| e.category_id == category_id && !e.is_deleted())
            .cloned()
            .collect();
        list.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        Ok(list)
    }

    /// Live envelopes of every live category in a budget
    pub fn get_budget_envelopes(&self, budget_id: BudgetId) -> Result<Vec<Envelope>, LedgerError> {
        let mut list = Vec::new();
        for category in self.get_categories(budget_id)? {
            list.extend(self.get_envelopes(category.id)?);
        }
        Ok(list)
    }

    pub fn get_envelope_by_name(
        &self,
        budget_id: BudgetId,
        name: &str,
    ) -> Result<Option<Envelope>, LedgerError> {
        let name_lower = name.to_lowercase();
        Ok(self
            .get_budget_envelopes(budget_id)?
            .into_iter()
            .find(|e| e.name.to_lowercase() == name_lower))
    }

    /// Budget that owns an envelope, through its category
    pub fn budget_of_envelope(&self, envelope_id: EnvelopeId) -> Result<Option<BudgetId>, LedgerError> {
        let Some(envelope) = self.get_envelope(envelope_id)? else {
            return Ok(None);
        };
        Ok(self.get_category(envelope.category_id)?.map(|c| c.budget_id))
    }

    pub fn upsert_envelope(&self, envelope: Envelope) -> Result<(), LedgerError> {
        write_lock(&self.envelopes)?.insert(envelope.id, envelope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, BudgetRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = BudgetRepository::new(temp_dir.path().join("budget.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_hierarchy_round_trip() {
        let (temp_dir, repo) = create_test_repo();
        let budget = Budget::new("Home");
        let category = Category::new(budget.id, "Needs");
        let envelope = Envelope::new(category.id, "Groceries");

        repo.upsert_budget(budget.clone()).unwrap();
        repo.upsert_category(category.clone()).unwrap();
        repo.upsert_envelope(envelope.clone()).unwrap();
        repo.save().unwrap();

        let reloaded = BudgetRepository::new(temp_dir.path().join("budget.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_categories(budget.id).unwrap().len(), 1);
        assert_eq!(reloaded.get_envelopes(category.id).unwrap()[0].name, "Groceries");
        assert_eq!(
            reloaded.budget_of_envelope(envelope.id).unwrap(),
            Some(budget.id)
        );
    }

    #[test]
    fn test_deleted_category_hides_envelopes() {
        let (_temp_dir, repo) = create_test_repo();
        let budget = Budget::new("Home");
        let mut category = Category::new(budget.id, "Wants");
        let envelope = Envelope::new(category.id, "Games");
        repo.upsert_envelope(envelope).unwrap();
        repo.upsert_category(category.clone()).unwrap();
        assert_eq!(repo.get_budget_envelopes(budget.id).unwrap().len(), 1);

        category.mark_deleted();
        repo.upsert_category(category).unwrap();
        assert!(repo.get_budget_envelopes(budget.id).unwrap().is_empty());
    }

    #[test]
    fn test_lookup_by_name() {
        let (_temp_dir, repo) = create_test_repo();
        let budget = Budget::new("Home");
        let category = Category::new(budget.id, "Needs");
        repo.upsert_budget(budget.clone()).unwrap();
        repo.upsert_category(category.clone()).unwrap();
        repo.upsert_envelope(Envelope::new(category.id, "Rent")).unwrap();

        assert!(repo.get_budget_by_name("home").unwrap().is_some());
        assert!(repo.get_category_by_name(budget.id, "NEEDS").unwrap().is_some());
        assert!(repo.get_envelope_by_name(budget.id, "rent").unwrap().is_some());
        assert!(repo.get_envelope_by_name(budget.id, "Fuel").unwrap().is_none());
    }
}
