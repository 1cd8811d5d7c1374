// crates/fluxion-cli/src/output.rs
//
// Output formatting utilities for the fluxion CLI.
// Supports table and JSON output modes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

use fluxion_core::{Address, Fgt, TokenAmount};
use fluxion_token::GovernanceToken;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    #[default]
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// One account in the closing balance sheet.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct BalanceRow {
    #[tabled(rename = "Account")]
    pub account: String,
    #[tabled(rename = "Balance")]
    pub balance: String,
    #[tabled(rename = "Staked")]
    pub staked: String,
    #[tabled(rename = "Roles")]
    pub roles: String,
}

/// Balance sheet rows for every holder and staker, in address order.
pub fn balance_rows(token: &GovernanceToken) -> Vec<BalanceRow> {
    let mut accounts: Vec<Address> = token.holders().map(|(addr, _)| *addr).collect();
    accounts.extend(token.stakers().map(|(addr, _)| *addr));
    accounts.sort();
    accounts.dedup();

    accounts
        .into_iter()
        .map(|account| {
            let staked: TokenAmount = token
                .stakers()
                .find(|(addr, _)| **addr == account)
                .map(|(_, amount)| amount)
                .unwrap_or(0);
            let roles = token
                .roles_of(&account)
                .iter()
                .map(|role| role.to_string())
                .collect::<Vec<_>>()
                .join(",");
            BalanceRow {
                account: account.to_hex(),
                balance: Fgt::from_units(token.balance_of(&account)).to_string(),
                staked: Fgt::from_units(staked).to_string(),
                roles,
            }
        })
        .collect()
}
