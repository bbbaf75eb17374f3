//! Category and Envelope models
//!
//! Categories group envelopes for display. Envelopes are the spending
//! buckets that receive monthly allocations; neither carries balance state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, CategoryId, EnvelopeId};

/// A group of envelopes within a budget (e.g., "Bills", "Needs")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub budget_id: BudgetId,

    pub name: String,

    #[serde(default)]
    pub note: String,

    /// Sort order for display
    #[serde(default)]
    pub sort_order: i32,

    #[serde(default)]
    pub hidden: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(budget_id: BudgetId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            budget_id,
            name: name.into(),
            note: String::new(),
            sort_order: 0,
            hidden: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_sort_order(budget_id: BudgetId, name: impl Into<String>, sort_order: i32) -> Self {
        let mut category = Self::new(budget_id, name);
        category.sort_order = sort_order;
        category
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A spending bucket inside a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub id: EnvelopeId,

    pub category_id: CategoryId,

    pub name: String,

    #[serde(default)]
    pub note: String,

    #[serde(default)]
    pub sort_order: i32,

    #[serde(default)]
    pub hidden: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Envelope {
    pub fn new(category_id: CategoryId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EnvelopeId::new(),
            category_id,
            name: name.into(),
            note: String::new(),
            sort_order: 0,
            hidden: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    /// Move to a different category
    pub fn move_to_category(&mut self, category_id: CategoryId) {
        self.category_id = category_id;
        self.updated_at = Utc::now();
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn validate_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.trim().is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }

    if name.len() > 50 {
        return Err(CategoryValidationError::NameTooLong(name.len()));
    }

    Ok(())
}

/// Starter categories created with a fresh budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultCategory {
    Bills,
    Needs,
    Wants,
    Savings,
}

impl DefaultCategory {
    pub fn all() -> &'static [Self] {
        &[Self::Bills, Self::Needs, Self::Wants, Self::Savings]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bills => "Bills",
            Self::Needs => "Needs",
            Self::Wants => "Wants",
            Self::Savings => "Savings",
        }
    }

    pub fn envelope_names(&self) -> &'static [&'static str] {
        match self {
            Self::Bills => &["Rent/Mortgage", "Electric", "Internet", "Phone"],
            Self::Needs => &["Groceries", "Transportation", "Medical"],
            Self::Wants => &["Dining Out", "Entertainment", "Subscriptions"],
            Self::Savings => &["Emergency Fund", "Vacation"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryValidationError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name too long ({0} chars, max 50)")]
    NameTooLong(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_envelope() {
        let category = Category::new(BudgetId::new(), "Needs");
        let envelope = Envelope::new(category.id, "Groceries");

        assert_eq!(envelope.category_id, category.id);
        assert!(!envelope.hidden);
        assert!(!envelope.is_deleted());
    }

    #[test]
    fn test_validation() {
        let mut category = Category::new(BudgetId::new(), "Valid");
        assert!(category.validate().is_ok());

        category.name = String::new();
        assert_eq!(category.validate(), Err(CategoryValidationError::EmptyName));

        let mut envelope = Envelope::new(category.id, "a".repeat(51));
        assert_eq!(
            envelope.validate(),
            Err(CategoryValidationError::NameTooLong(51))
        );
        envelope.rename("Rent");
        assert!(envelope.validate().is_ok());
    }

    #[test]
    fn test_move_envelope() {
        let budget = BudgetId::new();
        let first = Category::new(budget, "First");
        let second = Category::new(budget, "Second");
        let mut envelope = Envelope::new(first.id, "Gifts");

        envelope.move_to_category(second.id);
        assert_eq!(envelope.category_id, second.id);
    }

    #[test]
    fn test_default_categories() {
        let defaults = DefaultCategory::all();
        assert_eq!(defaults.len(), 4);
        assert_eq!(defaults[0].name(), "Bills");
        assert!(defaults[1].envelope_names().contains(&"Groceries"));
    }
}
