use super::commands::OutputFormat;
use super::utils::{print_header, print_json};
use zkyield_client::contracts::{explorer_address_link, DEPLOYER, DEPLOYMENT_BLOCK, DEPLOYMENT_DATE, NETWORK_NAME};
use zkyield_client::ClientConfig;
use zkyield_types::ZkYieldResult;

pub fn show_contracts(config: &ClientConfig, format: &OutputFormat) -> ZkYieldResult<()> {
    let addresses = config.contracts.addresses();
    let explorer = &config.network.explorer_url;

    match format {
        OutputFormat::Json => {
            let contracts: serde_json::Map<String, serde_json::Value> = addresses
                .entries()
                .iter()
                .map(|(name, address)| {
                    (
                        name.to_string(),
                        serde_json::json!({
                            "address": address,
                            "explorer": explorer_address_link(explorer, address),
                        }),
                    )
                })
                .collect();
            print_json(&serde_json::json!({
                "network": NETWORK_NAME,
                "chain_id": config.network.chain_id,
                "rpc_url": config.network.rpc_url,
                "deployment_block": DEPLOYMENT_BLOCK,
                "deployment_date": DEPLOYMENT_DATE,
                "deployer": DEPLOYER,
                "contracts": contracts,
            }))
        }
        OutputFormat::Text => {
            print_header("ZK-Yield Contracts");
            println!("Network:  {} (chain {})", NETWORK_NAME, config.network.chain_id);
            println!("RPC:      {}", config.network.rpc_url);
            println!("Deployed: block {} on {}", DEPLOYMENT_BLOCK, DEPLOYMENT_DATE);
            println!();
            for (name, address) in addresses.entries() {
                println!("{:<20} \x1b[38;5;51m{}\x1b[0m", name, address.to_hex());
                println!("{:<20} \x1b[38;5;245m{}\x1b[0m", "", explorer_address_link(explorer, &address));
            }
            Ok(())
        }
    }
}
