// crates/fluxion-cli/src/commands/config.rs
//
// `fluxion config` — print the effective configuration after defaults
// and the config file have been merged.

use crate::config::CliConfig;
use crate::output::{format_json, OutputFormat};

/// Run the config subcommand.
pub async fn run(config: &CliConfig, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    config.token.validate()?;
    match format {
        OutputFormat::Table => println!("{}", toml::to_string_pretty(config)?),
        OutputFormat::Json => println!("{}", format_json(config)),
    }
    Ok(())
}
