//! Config command handlers

use anyhow::{bail, Result};
use std::path::PathBuf;

use triagem_core::Config;

use crate::output::Output;
use crate::ConfigCommands;

/// Dispatch a config subcommand (show when none given)
pub fn handle(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => show(output),
        Some(ConfigCommands::Path) => {
            println!("{}", Config::config_file_path().display());
            Ok(())
        }
        Some(ConfigCommands::Set { key, value }) => set(key, value, output),
    }
}

fn show(output: &Output) -> Result<()> {
    let config = Config::load()?;

    if output.is_quiet() {
        return Ok(());
    }

    println!("base_url     = {}", config.base_url);
    println!(
        "api_key      = {}",
        if config.api_key.is_empty() {
            "(unset)".to_string()
        } else {
            mask(&config.api_key)
        }
    );
    println!("table        = {}", config.table);
    println!("realtime_url = {}", config.realtime_url());
    println!("data_dir     = {}", config.data_dir.display());
    println!();
    println!("Config file: {}", Config::config_file_path().display());
    Ok(())
}

fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load()?;

    match key.as_str() {
        "base_url" => config.base_url = value.clone(),
        "api_key" => config.api_key = value.clone(),
        "table" => config.table = value.clone(),
        "realtime_url" => {
            config.realtime_url = if value.is_empty() {
                None
            } else {
                Some(value.clone())
            }
        }
        "data_dir" => config.data_dir = PathBuf::from(&value),
        other => bail!(
            "Unknown config key '{}' (expected base_url, api_key, table, realtime_url, data_dir)",
            other
        ),
    }

    config.save()?;
    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

/// Show only the tail of a secret
fn mask(secret: &str) -> String {
    let chars = secret.chars().count();
    if chars <= 6 {
        "******".to_string()
    } else {
        let tail: String = secret.chars().skip(chars - 6).collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_only_tail() {
        assert_eq!(mask("short"), "******");
        assert_eq!(mask("a-much-longer-secret"), "...secret");
        // Tail is counted in chars, not bytes
        assert_eq!(mask("chave-secreta-é-válida"), "...válida");
    }
}
