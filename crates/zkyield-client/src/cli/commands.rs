use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use zkyield_types::Jurisdiction;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "zkyield")]
#[command(version = BUILD_VERSION)]
#[command(author = "ZK-Yield <team@zkyield.finance>")]
#[command(about = "ZK-Yield - Private KYC and balance proofs for compliant yield")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = "\x1b[38;5;245mWallet:\x1b[0m   set ZKYIELD_WALLET_KEY to sign transactions\n\x1b[38;5;245mNetwork:\x1b[0m  Base Sepolia (chain 84532) unless configured otherwise")]
pub struct Cli {
    #[arg(short, long, global = true, value_name = "FILE", help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[arg(long, global = true, value_name = "FILE", help = "Write logs to file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, global = true, default_value = "text", help = "Output format")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compute a commitment from a credential hash and salt")]
    #[command(long_about = "Compute (h + s)^2 + h * s mod 2^253.\n\nBoth values accept decimal or 0x-prefixed hex. Values of 2^253 or more are rejected.")]
    Commitment {
        #[arg(long, value_name = "INT", help = "Credential hash")]
        hash: String,
        #[arg(long, value_name = "INT", help = "Salt")]
        salt: String,
    },

    #[command(about = "Hash credential fields the way the demo issuer does")]
    CredentialHash {
        #[arg(long, help = "Holder name")]
        name: String,
        #[arg(long, default_value = "US", help = "Country component")]
        country: String,
        #[arg(long, value_name = "MILLIS", help = "Issue time in milliseconds (defaults to now)")]
        timestamp: Option<u64>,
    },

    #[command(about = "KYC proof and compliance grant")]
    Kyc {
        #[command(subcommand)]
        action: KycAction,
    },

    #[command(about = "Strategy vault deposits and withdrawals")]
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },

    #[command(about = "Verify a saved proof locally")]
    Verify {
        #[arg(long, value_name = "FILE", help = "Proof file written by 'kyc prove'")]
        proof: PathBuf,
    },

    #[command(about = "Show deployed contract addresses")]
    Contracts,

    #[command(about = "Manage configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum KycAction {
    #[command(about = "Issue a mock credential and generate a KYC proof")]
    Prove {
        #[arg(long, help = "Holder name")]
        name: String,
        #[arg(long, default_value = "us", help = "Claimed jurisdiction (us, eu, singapore)")]
        jurisdiction: Jurisdiction,
        #[arg(long, short, value_name = "FILE", help = "Where to write the proof")]
        out: Option<PathBuf>,
    },
    #[command(about = "Submit a KYC proof to the compliance manager")]
    #[command(long_about = "Submit a KYC proof to the compliance manager.\n\nEither load a proof written by 'kyc prove' or generate one inline with --name.")]
    Submit {
        #[arg(long, value_name = "FILE", help = "Proof file to submit", conflicts_with = "name")]
        proof: Option<PathBuf>,
        #[arg(long, help = "Holder name, to prove inline")]
        name: Option<String>,
        #[arg(long, default_value = "us", help = "Claimed jurisdiction (us, eu, singapore)")]
        jurisdiction: Jurisdiction,
        #[arg(long, default_value = "0", help = "Resend the same proof this many times on failure")]
        retries: u32,
    },
    #[command(about = "Show compliance status")]
    Status,
}

#[derive(Subcommand)]
pub enum VaultAction {
    #[command(about = "Prove balance and deposit ETH")]
    Deposit {
        #[arg(help = "Amount in ETH (e.g. 0.01)")]
        amount: String,
        #[arg(long, default_value = "0", help = "Resend the same proof this many times on failure")]
        retries: u32,
    },
    #[command(about = "Burn vault shares")]
    Withdraw {
        #[arg(long, help = "Shares to burn (defaults to all)")]
        shares: Option<u128>,
    },
    #[command(about = "Show vault position")]
    Position,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show effective configuration")]
    Show,
    #[command(about = "Validate configuration")]
    Validate,
    #[command(about = "Write a default configuration file")]
    Init {
        #[arg(short, long, help = "Overwrite existing configuration")]
        force: bool,
    },
}
