//! Monthly summary formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{BudgetMonth, EnvelopeMonth};

#[derive(Tabled)]
struct EnvelopeRow {
    #[tabled(rename = "Envelope")]
    name: String,
    #[tabled(rename = "Allocated")]
    allocation: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

/// Budget month as a table of categories and envelopes plus the totals
pub fn format_budget_month(month: &BudgetMonth, symbol: &str) -> String {
    let mut rows = Vec::new();

    for category in &month.categories {
        rows.push(EnvelopeRow {
            name: super::truncate(&category.name, 30),
            allocation: category.allocation.format_with_symbol(symbol),
            spent: category.spent.format_with_symbol(symbol),
            balance: category.balance.format_with_symbol(symbol),
        });
        for envelope in &category.envelopes {
            let marker = if envelope.is_overspent() { " !" } else { "" };
            rows.push(EnvelopeRow {
                name: format!("  {}{}", super::truncate(&envelope.name, 28), marker),
                allocation: envelope.allocation.format_with_symbol(symbol),
                spent: envelope.spent.format_with_symbol(symbol),
                balance: envelope.balance.format_with_symbol(symbol),
            });
        }
    }

    let mut output = format!("Budget for {}\n\n", month.month);

    if rows.is_empty() {
        output.push_str("No envelopes.\n");
    } else {
        let mut table = Table::new(rows);
        table.with(Style::psql());
        output.push_str(&format!("{}\n", table));
    }

    output.push('\n');
    output.push_str(&format!("  Income:    {}\n", month.income.format_with_symbol(symbol)));
    output.push_str(&format!("  Allocated: {}\n", month.allocated.format_with_symbol(symbol)));
    output.push_str(&format!("  Spent:     {}\n", month.spent.format_with_symbol(symbol)));
    output.push_str(&format!("  Balance:   {}\n", month.balance.format_with_symbol(symbol)));
    output.push_str(&format!("  Available: {}\n", month.available.format_with_symbol(symbol)));

    let overspent = month.overspent().count();
    if overspent > 0 {
        output.push_str(&format!("\n{} envelope(s) overspent\n", overspent));
    }

    output
}

/// One envelope's figures for a month
pub fn format_envelope_month(envelope: &EnvelopeMonth, symbol: &str) -> String {
    format!(
        "{} ({})\n  Allocated: {}\n  Spent:     {}\n  Balance:   {}\n",
        envelope.name,
        envelope.month,
        envelope.allocation.format_with_symbol(symbol),
        envelope.spent.format_with_symbol(symbol),
        envelope.balance.format_with_symbol(symbol),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetId, CategoryId, CategoryMonth, EnvelopeId, Money, Month};

    fn sample() -> BudgetMonth {
        let mut category = CategoryMonth::new(CategoryId::new(), "Needs");
        category.push(EnvelopeMonth {
            envelope_id: EnvelopeId::new(),
            name: "Groceries".into(),
            month: Month::new(2025, 1),
            spent: Money::from_cents(8000),
            balance: Money::from_cents(-3000),
            allocation: Money::from_cents(5000),
            allocation_id: None,
        });
        BudgetMonth {
            budget_id: BudgetId::new(),
            month: Month::new(2025, 1),
            income: Money::ZERO,
            allocated: category.allocation,
            balance: category.balance,
            spent: category.spent,
            available: Money::from_cents(13000),
            categories: vec![category],
        }
    }

    #[test]
    fn test_budget_month_table() {
        let output = format_budget_month(&sample(), "$");

        assert!(output.starts_with("Budget for 2025-01"));
        assert!(output.contains("Groceries !"));
        assert!(output.contains("-$30.00"));
        assert!(output.contains("Available: $130.00"));
        assert!(output.contains("1 envelope(s) overspent"));
    }

    #[test]
    fn test_envelope_month() {
        let month = sample();
        let envelope = &month.categories[0].envelopes[0];
        let output = format_envelope_month(envelope, "€");
        assert!(output.contains("Groceries (2025-01)"));
        assert!(output.contains("Allocated: €50.00"));
    }
}
