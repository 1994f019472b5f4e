use super::commands::{Cli, OutputFormat};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};
use zkyield_client::config::default_data_dir;
use zkyield_client::{LoggingConfig, TxReceipt};
use zkyield_crypto::{FieldInt, GeneratedProof, Proof};
use zkyield_types::{ErrorCategory, ZkYieldError, ZkYieldResult};

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

const RETRY_DELAY: Duration = Duration::from_secs(2);

pub const OK: &str = "\x1b[38;5;46m[+]\x1b[0m";
pub const FAIL: &str = "\x1b[38;5;196m[-]\x1b[0m";

pub fn init_logging(cli: &Cli, logging: &LoggingConfig) {
    let level = if cli.quiet {
        "warn".to_string()
    } else {
        match cli.verbose {
            0 => logging.level.to_string(),
            1 => "info,zkyield_client=debug,zkyield_crypto=debug".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let log_file = cli.log_file.as_ref().or(logging.file.as_ref());
    let file = log_file.and_then(|path| {
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("{} Cannot open log file {:?}: {}", FAIL, path, e);
                None
            }
        }
    });

    let ansi = file.is_none();
    let writer = match file {
        Some(file) => BoxMakeWriter::new(std::sync::Mutex::new(file)),
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let with_target = cli.verbose >= 2;
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match (cli.log_json || logging.json, logging.timestamps) {
        (true, _) => fmt::layer().json().with_writer(writer).boxed(),
        (false, true) => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(with_target)
            .boxed(),
        (false, false) => fmt::layer()
            .without_time()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(with_target)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .init();
}

pub fn print_banner() {
    println!("\x1b[38;5;46m");
    println!(r#"
    ███████╗██╗  ██╗   ██╗   ██╗██╗███████╗██╗     ██████╗
    ╚══███╔╝██║ ██╔╝   ╚██╗ ██╔╝██║██╔════╝██║     ██╔══██╗
      ███╔╝ █████╔╝█████╗╚████╔╝ ██║█████╗  ██║     ██║  ██║
     ███╔╝  ██╔═██╗╚════╝ ╚██╔╝  ██║██╔══╝  ██║     ██║  ██║
    ███████╗██║  ██╗       ██║   ██║███████╗███████╗██████╔╝
    ╚══════╝╚═╝  ╚═╝       ╚═╝   ╚═╝╚══════╝╚══════╝╚═════╝"#);
    println!("\x1b[0m");
    println!("        \x1b[38;5;245mCompliant yield with zero-knowledge KYC - v{}\x1b[0m", BUILD_VERSION);
    println!();
}

pub fn print_header(title: &str) {
    println!("\x1b[38;5;46m{}\x1b[0m", title);
    println!("\x1b[38;5;245m{}\x1b[0m", "═".repeat(50));
}

pub fn print_json(value: &serde_json::Value) -> ZkYieldResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| ZkYieldError::Serialization(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}

/// One line per error category, with what the user can do next.
pub fn report_error(err: &ZkYieldError) {
    match err.category() {
        ErrorCategory::Input => {
            eprintln!("{} {}", FAIL, err);
            eprintln!("    \x1b[38;5;245mNothing was sent. Fix the input and run the command again.\x1b[0m");
        }
        ErrorCategory::Proof => {
            eprintln!("{} {}", FAIL, err);
            eprintln!("    \x1b[38;5;245mNo proof was kept. Run the command again to start over.\x1b[0m");
        }
        ErrorCategory::Transaction => {
            eprintln!("{} {}", FAIL, err);
            eprintln!("    \x1b[38;5;245mThe proof is still valid. Retry with --retries or resubmit the saved proof.\x1b[0m");
        }
        ErrorCategory::System => {
            eprintln!("{} {}", FAIL, err);
            eprintln!("    \x1b[38;5;245mCheck your configuration and environment.\x1b[0m");
        }
    }
}

/// On-disk form of a generated proof, shared by `kyc prove`, `kyc submit`
/// and `verify`.
#[derive(Serialize, Deserialize)]
pub struct ProofFile {
    pub commitment: FieldInt,
    pub proof: Proof,
}

impl From<&GeneratedProof> for ProofFile {
    fn from(generated: &GeneratedProof) -> Self {
        Self {
            commitment: generated.commitment.clone(),
            proof: generated.proof.clone(),
        }
    }
}

impl From<ProofFile> for GeneratedProof {
    fn from(file: ProofFile) -> Self {
        Self {
            proof: file.proof,
            commitment: file.commitment,
        }
    }
}

pub fn default_proof_path() -> PathBuf {
    default_data_dir().join("kyc-proof.json")
}

pub fn write_proof_file(path: &Path, generated: &GeneratedProof) -> ZkYieldResult<()> {
    let json = serde_json::to_string_pretty(&ProofFile::from(generated))
        .map_err(|e| ZkYieldError::Serialization(e.to_string()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ZkYieldError::Internal(format!("Failed to create {:?}: {}", parent, e)))?;
    }
    std::fs::write(path, json)
        .map_err(|e| ZkYieldError::Internal(format!("Failed to write {:?}: {}", path, e)))
}

pub fn read_proof_file(path: &Path) -> ZkYieldResult<ProofFile> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ZkYieldError::InputValidation(format!("Cannot read {:?}: {}", path, e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| ZkYieldError::Serialization(format!("Invalid proof file: {}", e)))
}

/// Runs `first`, then `retry` up to `retries` times while the failure is a
/// transaction failure. Other errors end the loop at once.
pub async fn with_retries<F, R, FFut, RFut>(retries: u32, first: F, mut retry: R) -> ZkYieldResult<TxReceipt>
where
    F: FnOnce() -> FFut,
    FFut: Future<Output = ZkYieldResult<TxReceipt>>,
    R: FnMut() -> RFut,
    RFut: Future<Output = ZkYieldResult<TxReceipt>>,
{
    let mut result = first().await;
    let mut attempt = 0;
    while attempt < retries {
        match &result {
            Err(e) if e.category() == ErrorCategory::Transaction => {
                attempt += 1;
                warn!("Submission failed ({}), retrying {}/{}", e, attempt, retries);
                println!("{} {}. Retrying {}/{}...", FAIL, e, attempt, retries);
                tokio::time::sleep(RETRY_DELAY).await;
                result = retry().await;
            }
            _ => break,
        }
    }
    result
}

pub fn print_receipt(receipt: &TxReceipt, explorer: &str, format: &OutputFormat) -> ZkYieldResult<()> {
    let link = zkyield_client::contracts::explorer_tx_link(explorer, &receipt.tx_hash.to_hex());
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "tx_hash": receipt.tx_hash,
            "block_number": receipt.block_number,
            "gas_used": receipt.gas_used.map(|g| g.to_string()),
            "explorer": link,
        })),
        OutputFormat::Text => {
            println!("  Tx:       \x1b[38;5;245m{}\x1b[0m", receipt.tx_hash);
            if let Some(block) = receipt.block_number {
                println!("  Block:    {}", block);
            }
            println!("  Explorer: \x1b[38;5;51m{}\x1b[0m", link);
            Ok(())
        }
    }
}
