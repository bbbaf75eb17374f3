//! Strongly-typed ID wrappers
//!
//! Every entity gets its own UUID newtype so an `EnvelopeId` can never be
//! passed where an `AccountId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Short form used in tables and log lines
            pub fn short(&self) -> String {
                format!("{}{}", $display_prefix, &self.0.simple().to_string()[..8])
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(BudgetId, "bud-");
define_id!(CategoryId, "cat-");
define_id!(EnvelopeId, "env-");
define_id!(AccountId, "acc-");
define_id!(TransactionId, "txn-");
define_id!(MonthConfigId, "mcf-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form() {
        let id = EnvelopeId::new();
        let short = id.short();
        assert!(short.starts_with("env-"));
        assert_eq!(short.len(), 12);
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let plain: AccountId = uuid_str.parse().unwrap();
        let prefixed: AccountId = format!("acc-{}", uuid_str).parse().unwrap();
        assert_eq!(plain, prefixed);
        assert_eq!(plain.to_string(), uuid_str);
    }

    #[test]
    fn test_id_serialization() {
        let id = MonthConfigId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: MonthConfigId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
