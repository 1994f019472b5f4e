#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod contracts;
pub mod flows;
pub mod submission;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ClientConfig, LoggingConfig, LogLevel};
pub use context::AppContext;
pub use contracts::{
    ContractAddresses, ContractCall, ContractFunction, EvmTransactionLayer, TransactionLayer,
    TxHash, TxReceipt, VaultSnapshot,
};
pub use flows::{Freshness, KycService, VaultPosition, VaultService};
pub use submission::{
    EventBus, ProofRequest, RequestOutcome, RequestState, SubmissionEvent, SubmissionIntent,
    SubmissionOrchestrator, SubmissionPhase, SubmissionSnapshot,
};
