use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const DATA_DIR_NAME: &str = ".zkyield";

pub const MAX_PROOF_TIMEOUT_SECS: u64 = 600;

pub const WALLET_KEY_ENV: &str = "ZKYIELD_WALLET_KEY";

pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
}

pub fn default_config_path() -> PathBuf {
    default_data_dir().join(CONFIG_FILE_NAME)
}
