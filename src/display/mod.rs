//! Display formatting for terminal output
//!
//! Turns computed summaries and records into tables for the CLI.

pub mod account;
pub mod budget;
pub mod category;
pub mod transaction;

pub use account::format_account_list;
pub use budget::{format_budget_month, format_envelope_month};
pub use category::format_category_tree;
pub use transaction::format_transaction_register;

/// Truncate a string to `max_len` characters, ending in "..." when cut
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Groceries", 20), "Groceries");
        assert_eq!(truncate("Emergency Fund Contributions", 10), "Emergen...");
    }
}
