mod commands;
mod config_cmd;
mod contracts;
mod kyc;
mod proof_tools;
mod utils;
mod vault;

pub use commands::{Cli, Commands};
pub use config_cmd::handle_config;
pub use contracts::show_contracts;
pub use kyc::handle_kyc;
pub use proof_tools::{handle_commitment, handle_credential_hash, handle_verify};
pub use utils::{init_logging, report_error};
pub use vault::handle_vault;
