//! Circuit artifact generator for ZK-Yield.
//!
//! Runs a circuit-specific Groth16 setup and writes the artifact set the
//! client loads before proving.
//!
//! Usage:
//!   cargo run --bin zk-keygen -- generate --output ./circuits
//!   cargo run --bin zk-keygen -- verify --vk ./circuits/kyc.vk.json

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use zkyield_crypto::artifacts::{
    constraint_count, descriptor_file, fingerprint, setup_circuit, CIRCUIT_VERSION,
};
use zkyield_crypto::{CircuitDescriptor, CircuitKind, VerifyingKeyJson};

/// Groth16 key generation for ZK-Yield circuits.
#[derive(Parser)]
#[command(name = "zk-keygen")]
#[command(about = "Generate Groth16 proving and verification keys for ZK-Yield circuits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate new artifacts.
    Generate {
        /// Output directory.
        #[arg(short, long, default_value = "./circuits")]
        output: PathBuf,

        /// Circuit to generate (kyc, balance or all).
        #[arg(short, long, default_value = "all")]
        circuit: String,
    },

    /// Check a verification key against an expected fingerprint.
    Verify {
        /// Path to a `<kind>.vk.json` file.
        #[arg(short, long)]
        vk: PathBuf,

        /// Expected BLAKE3 fingerprint (hex).
        #[arg(short, long)]
        expected_hash: Option<String>,
    },

    /// Show descriptors of existing artifacts.
    Info {
        /// Directory containing artifacts.
        #[arg(short, long, default_value = "./circuits")]
        keys_dir: PathBuf,
    },
}

fn parse_circuits(circuit: &str) -> Result<Vec<CircuitKind>> {
    if circuit.eq_ignore_ascii_case("all") {
        return Ok(CircuitKind::ALL.to_vec());
    }
    let kind = circuit.parse::<CircuitKind>()?;
    Ok(vec![kind])
}

fn generate_keys(output_dir: &Path, circuit: &str) -> Result<()> {
    println!("ZK-Yield Key Generator v{}", CIRCUIT_VERSION);
    println!("==============================");

    for kind in parse_circuits(circuit)? {
        println!();
        println!("Circuit: {} ({} constraints)", kind, constraint_count(kind)?);
        println!("Running trusted setup (circuit-specific)...");

        let generated = setup_circuit(kind)?;
        for path in generated.write_to(output_dir)? {
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            println!("  {} ({} bytes)", path.display(), size);
        }
        println!("  VK hash: {}", generated.keys.descriptor.verifying_key_hash);
    }

    println!();
    println!("Key generation complete.");
    println!("Point the client at this directory with ZKYIELD_ARTIFACTS_DIR,");
    println!("or serve it over HTTP and set ZKYIELD_ARTIFACTS_URL.");
    Ok(())
}

fn verify_key(vk_path: &Path, expected_hash: Option<String>) -> Result<()> {
    println!("Verification key: {}", vk_path.display());

    let vk_bytes = fs::read(vk_path).with_context(|| format!("reading {}", vk_path.display()))?;
    let actual_hash = fingerprint(&vk_bytes);
    println!("VK hash: {}", actual_hash);
    println!("Size: {} bytes", vk_bytes.len());

    let vk_json: VerifyingKeyJson = serde_json::from_slice(&vk_bytes)?;
    vk_json.to_ark()?;
    println!("Parse: OK ({} public inputs)", vk_json.n_public);

    if let Some(expected) = expected_hash {
        if !actual_hash.eq_ignore_ascii_case(expected.trim()) {
            bail!(
                "hash mismatch: expected {}, actual {}",
                expected.trim(),
                actual_hash
            );
        }
        println!("Hash match: OK");
    }

    Ok(())
}

fn show_info(keys_dir: &Path) -> Result<()> {
    println!("ZK-Yield Circuit Artifacts");
    println!("==========================");
    println!("Directory: {}", keys_dir.display());

    let mut found = false;
    for kind in CircuitKind::ALL {
        let path = keys_dir.join(descriptor_file(kind));
        if !path.exists() {
            continue;
        }
        found = true;
        let descriptor: CircuitDescriptor = serde_json::from_slice(&fs::read(&path)?)?;
        println!();
        println!("{} circuit:", kind);
        println!("  Version: {}", descriptor.version);
        println!("  Public inputs: {:?}", kind.public_input_names());
        println!("  Constraints: {}", descriptor.num_constraints);
        println!("  PK hash: {}", descriptor.proving_key_hash);
        println!("  VK hash: {}", descriptor.verifying_key_hash);
        println!("  Generated: {}", descriptor.generated_at.to_rfc3339());
    }

    if !found {
        println!();
        println!("No artifacts found. Run 'zk-keygen generate' first.");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { output, circuit } => generate_keys(&output, &circuit),
        Commands::Verify { vk, expected_hash } => verify_key(&vk, expected_hash),
        Commands::Info { keys_dir } => show_info(&keys_dir),
    }
}
