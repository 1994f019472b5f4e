mod cli;

use clap::Parser;
use cli::{
    Cli, Commands, init_logging, report_error, handle_commitment, handle_credential_hash,
    handle_verify, handle_kyc, handle_vault, show_contracts, handle_config,
};
use std::path::Path;
use zkyield_client::config::default_config_path;
use zkyield_client::{AppContext, ClientConfig};
use zkyield_types::ZkYieldResult;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let loaded = ClientConfig::load(&config_path);
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();

    init_logging(&cli, &logging);

    if let Err(e) = run(cli, &config_path, loaded).await {
        report_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config_path: &Path, loaded: ZkYieldResult<ClientConfig>) -> ZkYieldResult<()> {
    let format = cli.format;

    match cli.command {
        Commands::Commitment { hash, salt } => {
            handle_commitment(&hash, &salt, &format)?;
        }
        Commands::CredentialHash { name, country, timestamp } => {
            handle_credential_hash(&name, &country, timestamp, &format)?;
        }
        Commands::Config { action } => {
            handle_config(config_path, action, &format)?;
        }
        Commands::Contracts => {
            show_contracts(&loaded?, &format)?;
        }
        Commands::Verify { proof } => {
            handle_verify(&loaded?, &proof, &format).await?;
        }
        Commands::Kyc { action } => {
            let config = loaded?;
            config.log_warnings();
            let ctx = AppContext::connect(config).await?;
            handle_kyc(&ctx, action, &format).await?;
        }
        Commands::Vault { action } => {
            let config = loaded?;
            config.log_warnings();
            let ctx = AppContext::connect(config).await?;
            handle_vault(&ctx, action, &format).await?;
        }
    }

    Ok(())
}
