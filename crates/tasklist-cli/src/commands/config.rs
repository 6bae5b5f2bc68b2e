//! Config command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use tasklist_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "user_id": config.user_id,
                    "notice_timeout_ms": config.notice_timeout_ms,
                    "request_timeout_secs": config.request_timeout_secs,
                    "data_dir": config.data_dir,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.api_url);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  api_url:              {}", config.api_url);
            println!(
                "  user_id:              {}",
                config
                    .user_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  notice_timeout_ms:    {}", config.notice_timeout_ms);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!("  data_dir:             {}", config.data_dir.display());
            println!(
                "  log_file:             {}",
                config.log_path().display()
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    config.set(&key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_writes_to_cli_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set("user_id".to_string(), "7".to_string(), Some(&path), &output).unwrap();
        set(
            "notice_timeout_ms".to_string(),
            "1500".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let saved: Config = toml::from_str(&content).unwrap();
        assert_eq!(saved.user_id, Some(7));
        assert_eq!(saved.notice_timeout_ms, 1500);
    }

    #[test]
    fn test_set_unknown_key_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        assert!(set("colour".to_string(), "blue".to_string(), Some(&path), &output).is_err());
        assert!(!path.exists());
    }
}
