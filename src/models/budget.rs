//! Budget model
//!
//! A budget is the top-level container for accounts, categories and
//! envelopes. It holds no computed state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::BudgetId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    pub name: String,

    #[serde(default)]
    pub note: String,

    /// Display symbol for amounts in this budget
    #[serde(default = "default_currency")]
    pub currency: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "$".to_string()
}

impl Budget {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            name: name.into(),
            note: String::new(),
            currency: default_currency(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
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

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(BudgetValidationError::NameTooLong(self.name.len()));
        }

        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BudgetValidationError {
    #[error("Budget name cannot be empty")]
    EmptyName,
    #[error("Budget name too long ({0} chars, max 100)")]
    NameTooLong(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_budget() {
        let budget = Budget::new("Household");
        assert_eq!(budget.currency, "$");
        assert_eq!(budget.to_string(), "Household");
        assert!(budget.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut budget = Budget::new("");
        assert_eq!(budget.validate(), Err(BudgetValidationError::EmptyName));
        budget.rename("x".repeat(101));
        assert_eq!(budget.validate(), Err(BudgetValidationError::NameTooLong(101)));
    }

    #[test]
    fn test_currency_default_on_deserialize() {
        let budget = Budget::new("Home").with_currency("€");
        let mut json = serde_json::to_value(&budget).unwrap();
        json.as_object_mut().unwrap().remove("currency");
        let restored: Budget = serde_json::from_value(json).unwrap();
        assert_eq!(restored.currency, "$");
    }
}
