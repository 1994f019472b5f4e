use super::commands::OutputFormat;
use super::utils::{print_header, print_json, read_proof_file, FAIL, OK};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use zkyield_client::ClientConfig;
use zkyield_crypto::{
    compute_commitment, format_for_contract, hash_credential, FieldInt, Groth16Backend,
    ProofGenerator,
};
use zkyield_types::ZkYieldResult;

pub fn handle_commitment(hash: &str, salt: &str, format: &OutputFormat) -> ZkYieldResult<()> {
    let hash: FieldInt = hash.parse()?;
    let salt: FieldInt = salt.parse()?;
    let commitment = compute_commitment(&hash, &salt);

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "credential_hash": hash,
            "salt": salt,
            "commitment": commitment,
        })),
        OutputFormat::Text => {
            println!("Credential hash: {}", hash);
            println!("Salt:            {}", salt);
            println!("Commitment:      \x1b[38;5;46m{}\x1b[0m", commitment);
            Ok(())
        }
    }
}

pub fn handle_credential_hash(
    name: &str,
    country: &str,
    timestamp: Option<u64>,
    format: &OutputFormat,
) -> ZkYieldResult<()> {
    let timestamp = timestamp
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().max(0) as u64);
    let hash = hash_credential(name, country, timestamp);

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "name": name,
            "country": country,
            "timestamp": timestamp,
            "credential_hash": hash,
        })),
        OutputFormat::Text => {
            println!("Input:           {}-{}-{}", name, country, timestamp);
            println!("Credential hash: \x1b[38;5;46m{}\x1b[0m", hash);
            Ok(())
        }
    }
}

pub async fn handle_verify(
    config: &ClientConfig,
    path: &Path,
    format: &OutputFormat,
) -> ZkYieldResult<()> {
    let file = read_proof_file(path)?;
    let binds_commitment = file.proof.commitment() == Some(&file.commitment);

    let source = config.prover.artifact_source();
    debug!(source = %source, "Loading verifying key");
    let generator = ProofGenerator::new(Arc::new(Groth16Backend::new(source)));
    let valid = binds_commitment && generator.verify(&file.proof).await?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "circuit": file.proof.kind,
            "commitment": file.commitment,
            "public_signals": file.proof.public_signals,
            "binds_commitment": binds_commitment,
            "valid": valid,
            "calldata": format_for_contract(&file.proof).to_calldata(),
        })),
        OutputFormat::Text => {
            print_header("Proof Verification");
            println!("Circuit:    {}", file.proof.kind);
            println!("Commitment: {}", file.commitment);
            for (name, signal) in file
                .proof
                .kind
                .public_input_names()
                .iter()
                .zip(&file.proof.public_signals)
            {
                println!("  {:<20} {}", name, signal);
            }
            if valid {
                println!("{} Proof is valid", OK);
            } else if !binds_commitment {
                println!("{} Proof does not bind the recorded commitment", FAIL);
            } else {
                println!("{} Proof does not verify against its public signals", FAIL);
            }
            Ok(())
        }
    }
}
