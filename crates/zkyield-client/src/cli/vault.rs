use super::commands::{OutputFormat, VaultAction};
use super::utils::{print_header, print_json, print_receipt, with_retries, OK};
use zkyield_client::{AppContext, Freshness};
use zkyield_types::ZkYieldResult;

pub async fn handle_vault(ctx: &AppContext, action: VaultAction, format: &OutputFormat) -> ZkYieldResult<()> {
    let vault = ctx.vault_service()?;
    let explorer = &ctx.config().network.explorer_url;

    match action {
        VaultAction::Deposit { amount, retries } => {
            let value = vault.check_deposit(&amount)?;
            println!("Depositing \x1b[38;5;46m{} ETH\x1b[0m...", value);
            println!("Proving a balance of at least {} ETH, then sending the deposit...", vault.min_deposit());
            let receipt = with_retries(
                retries,
                || vault.deposit(&amount),
                || vault.resume_deposit(&amount),
            )
            .await?;
            if matches!(format, OutputFormat::Text) {
                println!("{} Deposited {} ETH", OK, value);
            }
            print_receipt(&receipt, explorer, format)?;
        }
        VaultAction::Withdraw { shares } => {
            match shares {
                Some(n) => println!("Withdrawing \x1b[38;5;226m{}\x1b[0m shares...", n),
                None => println!("Withdrawing all shares..."),
            }
            let receipt = vault.withdraw(shares).await?;
            if matches!(format, OutputFormat::Text) {
                println!("{} Withdrawal confirmed", OK);
            }
            print_receipt(&receipt, explorer, format)?;
        }
        VaultAction::Position => {
            let position = vault.position().await?;
            let value = position.user_value();

            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "account": position.account,
                    "shares": position.shares.to_string(),
                    "total_shares": position.total_shares.to_string(),
                    "tvl_eth": position.tvl.to_decimal(),
                    "value_eth": value.to_decimal(),
                    "fetched_at": position.fetched_at,
                    "fresh": position.freshness == Freshness::Fresh,
                }))?,
                OutputFormat::Text => {
                    print_header("Vault Position");
                    println!("Account:      \x1b[38;5;51m{}\x1b[0m", position.account.to_hex());
                    println!("Shares:       \x1b[38;5;46m{}\x1b[0m", position.display_shares());
                    println!("Value:        {} ETH", value.to_fixed(4));
                    println!("Vault TVL:    {} ETH", position.tvl.to_fixed(4));
                    println!("Min deposit:  {} ETH", vault.min_deposit());
                    if !position.has_shares() {
                        println!("\n\x1b[38;5;245mNo shares yet. Deposit with 'zkyield vault deposit <ETH>'.\x1b[0m");
                    }
                }
            }
        }
    }
    Ok(())
}
