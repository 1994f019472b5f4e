mod kyc;
mod vault;

pub use kyc::KycService;
pub use vault::{Freshness, VaultPosition, VaultService};

#[cfg(test)]
mod tests;
