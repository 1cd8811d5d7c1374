// crates/fluxion-cli/src/config.rs
//
// Runtime configuration for the fluxion CLI.
// Loaded from a TOML file or populated with defaults.
//
// The `[token]` table holds the genesis parameters handed to the ledger;
// top-level keys control logging and output.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use fluxion_token::TokenConfig;

use crate::output::OutputFormat;

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default output format when `--output` is not given.
    #[serde(default)]
    pub output: OutputFormat,

    /// Genesis parameters for the simulated ledger.
    #[serde(default)]
    pub token: TokenConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output: OutputFormat::default(),
            token: TokenConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// A leading `~/` is expanded to the home directory.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_home(path))?;
        let config: CliConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

/// Default config location: `~/.fluxion/config.toml`.
pub fn default_config_path() -> String {
    dirs::home_dir()
        .map(|home| home.join(".fluxion").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("fluxion.toml"))
        .to_string_lossy()
        .into_owned()
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.output, OutputFormat::Table);
        assert_eq!(config.token, TokenConfig::default());
    }

    #[test]
    fn test_token_table_overrides() {
        let raw = r#"
            log_level = "debug"
            output = "json"

            [token]
            symbol = "TST"
            treasury_fee_rate_bps = 250
            treasury = "0x0000000000000000000000000000000000000009"
        "#;
        let config: CliConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.token.symbol, "TST");
        assert_eq!(config.token.treasury_fee_rate_bps, 250);
        assert_eq!(config.token.treasury, fluxion_core::Address::from_low_u64(9));
        assert_eq!(config.token.max_supply_tokens, 1_000_000_000);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(CliConfig::load("/nonexistent/fluxion/config.toml").is_err());
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/etc/fluxion.toml"), PathBuf::from("/etc/fluxion.toml"));
    }
}
