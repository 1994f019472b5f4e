use super::commands::{ConfigAction, OutputFormat};
use super::utils::{print_banner, print_json, FAIL, OK};
use std::path::Path;
use zkyield_client::config::WarningSeverity;
use zkyield_client::ClientConfig;
use zkyield_types::{ZkYieldError, ZkYieldResult};

pub fn handle_config(
    config_path: &Path,
    action: Option<ConfigAction>,
    format: &OutputFormat,
) -> ZkYieldResult<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let config = ClientConfig::load(config_path)?;
            match format {
                OutputFormat::Json => {
                    let value = serde_json::to_value(&config)
                        .map_err(|e| ZkYieldError::Serialization(e.to_string()))?;
                    print_json(&value)?;
                }
                OutputFormat::Text => {
                    if !config_path.exists() {
                        println!("\x1b[38;5;245m# No file at {:?}, showing defaults\x1b[0m", config_path);
                    }
                    println!("{}", config.to_toml()?);
                }
            }
        }
        Some(ConfigAction::Validate) => match ClientConfig::load(config_path) {
            Ok(config) => {
                println!("{} Configuration is valid", OK);
                for warning in config.check_warnings() {
                    let color = match warning.severity {
                        WarningSeverity::High => "196",
                        WarningSeverity::Medium => "226",
                        WarningSeverity::Low => "245",
                    };
                    println!("  \x1b[38;5;{}m{:?}\x1b[0m {}", color, warning.severity, warning.message);
                    println!("      {}", warning.recommendation);
                }
            }
            Err(e) => println!("{} Configuration error: {}", FAIL, e),
        },
        Some(ConfigAction::Init { force }) => {
            if config_path.exists() && !force {
                return Err(ZkYieldError::InputValidation(format!(
                    "{:?} already exists (use --force to overwrite)",
                    config_path
                )));
            }
            ClientConfig::default().save(config_path)?;
            print_banner();
            println!("{} Configuration written to {:?}", OK, config_path);
            println!("Set \x1b[38;5;51mZKYIELD_WALLET_KEY\x1b[0m to sign transactions.");
        }
    }
    Ok(())
}
