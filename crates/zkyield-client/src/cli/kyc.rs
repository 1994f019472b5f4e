use super::commands::{KycAction, OutputFormat};
use super::utils::{
    default_proof_path, print_header, print_json, print_receipt, read_proof_file, with_retries,
    write_proof_file, OK,
};
use zkyield_client::AppContext;
use zkyield_crypto::format_for_contract;
use zkyield_types::{Jurisdiction, ZkYieldError, ZkYieldResult};

pub async fn handle_kyc(ctx: &AppContext, action: KycAction, format: &OutputFormat) -> ZkYieldResult<()> {
    let kyc = ctx.kyc_service();
    let explorer = &ctx.config().network.explorer_url;

    match action {
        KycAction::Prove { name, jurisdiction, out } => {
            println!("Generating KYC proof for \x1b[38;5;51m{}\x1b[0m...", jurisdiction);
            let generated = kyc.prepare(&name, jurisdiction).await?;
            let path = out.unwrap_or_else(default_proof_path);
            write_proof_file(&path, &generated)?;

            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "circuit": generated.proof.kind,
                    "commitment": generated.commitment,
                    "proof_file": path,
                    "calldata": format_for_contract(&generated.proof).to_calldata(),
                }))?,
                OutputFormat::Text => {
                    println!("{} Proof generated", OK);
                    println!("  Commitment: \x1b[38;5;46m{}\x1b[0m", generated.commitment);
                    println!("  Saved to:   {}", path.display());
                    println!("\nSubmit with '\x1b[38;5;51mzkyield kyc submit --proof {}\x1b[0m'", path.display());
                }
            }
        }
        KycAction::Submit { proof, name, jurisdiction, retries } => {
            match (proof, name) {
                (Some(path), _) => {
                    let file = read_proof_file(&path)?;
                    kyc.load(file.into()).await?;
                    println!("Loaded proof from {}", path.display());
                }
                (None, Some(name)) => {
                    println!("Generating KYC proof for \x1b[38;5;51m{}\x1b[0m...", jurisdiction);
                    kyc.prepare(&name, jurisdiction).await?;
                }
                (None, None) => {
                    return Err(ZkYieldError::InputValidation(
                        "Provide --proof FILE or --name NAME".into(),
                    ));
                }
            }

            println!("Submitting to the compliance manager...");
            let receipt = with_retries(retries, || kyc.submit(), || kyc.submit()).await?;
            if matches!(format, OutputFormat::Text) {
                println!("{} Compliance granted", OK);
            }
            print_receipt(&receipt, explorer, format)?;
        }
        KycAction::Status => {
            let account = ctx.transactions().account()?;
            let compliant = kyc.is_compliant().await?;
            let allowed = kyc.allowed_jurisdiction().await?;
            let allowed_name = Jurisdiction::from_code(allowed)
                .map(|j| j.to_string())
                .unwrap_or_else(|_| format!("code {}", allowed));

            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "account": account,
                    "compliant": compliant,
                    "allowed_jurisdiction": allowed,
                }))?,
                OutputFormat::Text => {
                    print_header("KYC Status");
                    println!("Account:      \x1b[38;5;51m{}\x1b[0m", account.to_hex());
                    if compliant {
                        println!("Compliance:   \x1b[38;5;46mverified\x1b[0m");
                    } else {
                        println!("Compliance:   \x1b[38;5;226mnot verified\x1b[0m");
                    }
                    println!("Jurisdiction: {}", allowed_name);
                }
            }
        }
    }
    Ok(())
}
