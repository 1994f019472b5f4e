#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod artifacts;
pub mod circuit;
pub mod commitment;
pub mod credential;
pub mod field;
pub mod format;
pub mod proof;
pub mod prover;

pub use artifacts::{ArtifactSource, ArtifactStore, CircuitDescriptor, CircuitKeys, VerifyingKeyJson};
pub use circuit::{BalanceCircuit, CircuitInputs, CircuitKind, KycCircuit};
pub use commitment::{compute_commitment, CommitmentLimbs};
pub use credential::{generate_salt, hash_credential, hash_str, Credential};
pub use field::{sum_and_product, FieldInt};
pub use format::{format_for_contract, ContractProof};
pub use proof::Proof;
pub use prover::{GeneratedProof, Groth16Backend, ProofGenerator, ProvingBackend};
