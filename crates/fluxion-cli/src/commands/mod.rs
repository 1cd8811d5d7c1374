// crates/fluxion-cli/src/commands/mod.rs
//
// Command module declarations for the fluxion CLI.

pub mod config;
pub mod simulate;
