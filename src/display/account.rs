//! Account display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Account, AccountBalance, Money};

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Available")]
    available: String,
}

fn kind(account: &Account) -> &'static str {
    if account.external {
        "external"
    } else if account.on_budget {
        "on-budget"
    } else {
        "off-budget"
    }
}

/// Accounts with their balances, followed by the on-budget total
pub fn format_account_list(accounts: &[(Account, AccountBalance)], symbol: &str) -> String {
    if accounts.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let mut rows: Vec<AccountRow> = accounts
        .iter()
        .map(|(account, balance)| AccountRow {
            name: super::truncate(&account.name, 30),
            kind: kind(account),
            balance: balance.balance.format_with_symbol(symbol),
            available: balance.available.format_with_symbol(symbol),
        })
        .collect();

    let on_budget: Vec<_> = accounts.iter().filter(|(a, _)| a.on_budget).collect();
    rows.push(AccountRow {
        name: "On-budget total".into(),
        kind: "",
        balance: on_budget
            .iter()
            .map(|(_, b)| b.balance)
            .sum::<Money>()
            .format_with_symbol(symbol),
        available: on_budget
            .iter()
            .map(|(_, b)| b.available)
            .sum::<Money>()
            .format_with_symbol(symbol),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Balance lines for a single account
pub fn format_account_balance(account: &Account, balance: &AccountBalance, symbol: &str) -> String {
    format!(
        "{} ({})\n  Balance:   {}\n  Available: {}\n",
        account.name,
        kind(account),
        balance.balance.format_with_symbol(symbol),
        balance.available.format_with_symbol(symbol),
    )
}
