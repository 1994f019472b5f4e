//! Circuit artifacts: descriptor, proving key and verification key.
//!
//! Per circuit kind the artifact set is three files:
//! `<kind>.circuit.json`, `<kind>.pk.bin` and `<kind>.vk.json`. The
//! descriptor pins both keys by BLAKE3 fingerprint. Artifacts load once
//! per kind and are shared read-only afterwards.

use crate::circuit::{AnyCircuit, CircuitKind};
use crate::proof::{coords_serde, coords_to_g1, coords_to_g2, g1_to_coords, g2_to_coords};
use ark_bn254::{Bn254, Fr, G1Affine, G2Affine};
use ark_groth16::{Groth16, PreparedVerifyingKey, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, SynthesisMode};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::thread_rng;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use zkyield_types::{ZkYieldError, ZkYieldResult};

pub const CIRCUIT_VERSION: &str = "1.0.0";

pub fn descriptor_file(kind: CircuitKind) -> String {
    format!("{}.circuit.json", kind)
}

pub fn proving_key_file(kind: CircuitKind) -> String {
    format!("{}.pk.bin", kind)
}

pub fn verifying_key_file(kind: CircuitKind) -> String {
    format!("{}.vk.json", kind)
}

pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

fn unavailable(kind: CircuitKind, reason: impl fmt::Display) -> ZkYieldError {
    ZkYieldError::ProofGeneration(format!("Circuit artifacts unavailable for {}: {}", kind, reason))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitDescriptor {
    pub circuit: CircuitKind,
    pub version: String,
    pub num_public_inputs: usize,
    pub num_constraints: usize,
    pub proving_key_hash: String,
    pub verifying_key_hash: String,
    pub generated_at: DateTime<Utc>,
}

/// Verification key in the JSON layout used by common Groth16 tooling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyingKeyJson {
    pub protocol: String,
    pub curve: String,
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    pub vk_alpha_1: [String; 3],
    pub vk_beta_2: [[String; 2]; 3],
    pub vk_gamma_2: [[String; 2]; 3],
    pub vk_delta_2: [[String; 2]; 3],
    #[serde(rename = "IC")]
    pub ic: Vec<[String; 3]>,
}

fn g1_json(point: &G1Affine) -> [String; 3] {
    let [x, y] = g1_to_coords(point);
    let z = if point.infinity { "0" } else { "1" };
    [x.to_string(), y.to_string(), z.to_string()]
}

fn g2_json(point: &G2Affine) -> [[String; 2]; 3] {
    let [x, y] = g2_to_coords(point);
    let z = if point.infinity { ["0", "0"] } else { ["1", "0"] };
    [
        [x[0].to_string(), x[1].to_string()],
        [y[0].to_string(), y[1].to_string()],
        [z[0].to_string(), z[1].to_string()],
    ]
}

fn parse_json(s: &str) -> ZkYieldResult<num_bigint::BigUint> {
    coords_serde::parse(s).map_err(ZkYieldError::Serialization)
}

fn g1_from_json(raw: &[String; 3]) -> ZkYieldResult<G1Affine> {
    if raw[2] == "0" {
        return coords_to_g1(&Default::default());
    }
    coords_to_g1(&[parse_json(&raw[0])?, parse_json(&raw[1])?])
}

fn g2_from_json(raw: &[[String; 2]; 3]) -> ZkYieldResult<G2Affine> {
    if raw[2][0] == "0" && raw[2][1] == "0" {
        return coords_to_g2(&Default::default());
    }
    coords_to_g2(&[
        [parse_json(&raw[0][0])?, parse_json(&raw[0][1])?],
        [parse_json(&raw[1][0])?, parse_json(&raw[1][1])?],
    ])
}

impl VerifyingKeyJson {
    pub fn from_ark(vk: &VerifyingKey<Bn254>) -> Self {
        Self {
            protocol: "groth16".into(),
            curve: "bn128".into(),
            n_public: vk.gamma_abc_g1.len().saturating_sub(1),
            vk_alpha_1: g1_json(&vk.alpha_g1),
            vk_beta_2: g2_json(&vk.beta_g2),
            vk_gamma_2: g2_json(&vk.gamma_g2),
            vk_delta_2: g2_json(&vk.delta_g2),
            ic: vk.gamma_abc_g1.iter().map(g1_json).collect(),
        }
    }

    pub fn to_ark(&self) -> ZkYieldResult<VerifyingKey<Bn254>> {
        if self.protocol != "groth16" {
            return Err(ZkYieldError::Serialization(format!(
                "Unsupported protocol: {}",
                self.protocol
            )));
        }
        if self.ic.len() != self.n_public + 1 {
            return Err(ZkYieldError::Serialization(format!(
                "IC has {} points for {} public inputs",
                self.ic.len(),
                self.n_public
            )));
        }
        Ok(VerifyingKey {
            alpha_g1: g1_from_json(&self.vk_alpha_1)?,
            beta_g2: g2_from_json(&self.vk_beta_2)?,
            gamma_g2: g2_from_json(&self.vk_gamma_2)?,
            delta_g2: g2_from_json(&self.vk_delta_2)?,
            gamma_abc_g1: self.ic.iter().map(g1_from_json).collect::<ZkYieldResult<_>>()?,
        })
    }
}

/// Loaded, validated keys for one circuit.
pub struct CircuitKeys {
    pub descriptor: CircuitDescriptor,
    pub proving_key: ProvingKey<Bn254>,
    pub verifying_key: VerifyingKey<Bn254>,
    pub prepared: PreparedVerifyingKey<Bn254>,
}

impl CircuitKeys {
    /// Parses an artifact set, checking fingerprints and that the proving
    /// key embeds the published verification key.
    pub fn from_files(
        kind: CircuitKind,
        descriptor_bytes: &[u8],
        proving_key_bytes: &[u8],
        verifying_key_bytes: &[u8],
    ) -> ZkYieldResult<Self> {
        let descriptor: CircuitDescriptor = serde_json::from_slice(descriptor_bytes)
            .map_err(|e| unavailable(kind, format!("bad descriptor: {}", e)))?;
        if descriptor.circuit != kind {
            return Err(unavailable(
                kind,
                format!("descriptor is for circuit {}", descriptor.circuit),
            ));
        }
        if descriptor.num_public_inputs != kind.num_public_inputs() {
            return Err(unavailable(kind, "public input count mismatch"));
        }
        if fingerprint(proving_key_bytes) != descriptor.proving_key_hash {
            return Err(unavailable(kind, "proving key fingerprint mismatch"));
        }
        if fingerprint(verifying_key_bytes) != descriptor.verifying_key_hash {
            return Err(unavailable(kind, "verification key fingerprint mismatch"));
        }

        let proving_key = ProvingKey::<Bn254>::deserialize_compressed(proving_key_bytes)
            .map_err(|e| unavailable(kind, format!("bad proving key: {}", e)))?;
        let vk_json: VerifyingKeyJson = serde_json::from_slice(verifying_key_bytes)
            .map_err(|e| unavailable(kind, format!("bad verification key: {}", e)))?;
        let verifying_key = vk_json.to_ark().map_err(|e| unavailable(kind, e))?;
        if verifying_key != proving_key.vk {
            return Err(unavailable(kind, "proving and verification keys do not match"));
        }

        Self::from_parts(descriptor, proving_key, verifying_key)
    }

    fn from_parts(
        descriptor: CircuitDescriptor,
        proving_key: ProvingKey<Bn254>,
        verifying_key: VerifyingKey<Bn254>,
    ) -> ZkYieldResult<Self> {
        let prepared = Groth16::<Bn254>::process_vk(&verifying_key)
            .map_err(|e| unavailable(descriptor.circuit, e))?;
        Ok(Self {
            descriptor,
            proving_key,
            verifying_key,
            prepared,
        })
    }
}

/// Output of a fresh circuit-specific setup.
pub struct GeneratedArtifacts {
    pub descriptor_json: Vec<u8>,
    pub proving_key_bytes: Vec<u8>,
    pub verifying_key_json: Vec<u8>,
    pub keys: CircuitKeys,
}

impl GeneratedArtifacts {
    pub fn write_to(&self, dir: &Path) -> ZkYieldResult<Vec<PathBuf>> {
        let kind = self.keys.descriptor.circuit;
        std::fs::create_dir_all(dir).map_err(|e| ZkYieldError::Internal(e.to_string()))?;
        let files = [
            (descriptor_file(kind), &self.descriptor_json),
            (proving_key_file(kind), &self.proving_key_bytes),
            (verifying_key_file(kind), &self.verifying_key_json),
        ];
        let mut written = Vec::with_capacity(files.len());
        for (name, bytes) in files {
            let path = dir.join(name);
            std::fs::write(&path, bytes)
                .map_err(|e| ZkYieldError::Internal(format!("{}: {}", path.display(), e)))?;
            written.push(path);
        }
        Ok(written)
    }
}

pub fn constraint_count(kind: CircuitKind) -> ZkYieldResult<usize> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    cs.set_mode(SynthesisMode::Setup);
    AnyCircuit::setup(kind)
        .generate_constraints(cs.clone())
        .map_err(|e| ZkYieldError::Internal(format!("Constraint synthesis failed: {}", e)))?;
    Ok(cs.num_constraints())
}

/// Runs a circuit-specific Groth16 setup. The toxic waste lives only in
/// this process, so keys from here are for development and testing.
pub fn setup_circuit(kind: CircuitKind) -> ZkYieldResult<GeneratedArtifacts> {
    let mut rng = thread_rng();
    let (proving_key, verifying_key) =
        Groth16::<Bn254>::circuit_specific_setup(AnyCircuit::setup(kind), &mut rng)
            .map_err(|e| ZkYieldError::ProofGeneration(format!("Setup failed for {}: {}", kind, e)))?;

    let mut proving_key_bytes = Vec::new();
    proving_key
        .serialize_compressed(&mut proving_key_bytes)
        .map_err(|e| ZkYieldError::Serialization(e.to_string()))?;
    let verifying_key_json = serde_json::to_vec_pretty(&VerifyingKeyJson::from_ark(&verifying_key))
        .map_err(|e| ZkYieldError::Serialization(e.to_string()))?;

    let descriptor = CircuitDescriptor {
        circuit: kind,
        version: CIRCUIT_VERSION.to_string(),
        num_public_inputs: kind.num_public_inputs(),
        num_constraints: constraint_count(kind)?,
        proving_key_hash: fingerprint(&proving_key_bytes),
        verifying_key_hash: fingerprint(&verifying_key_json),
        generated_at: Utc::now(),
    };
    let descriptor_json = serde_json::to_vec_pretty(&descriptor)
        .map_err(|e| ZkYieldError::Serialization(e.to_string()))?;

    debug!(
        circuit = %kind,
        constraints = descriptor.num_constraints,
        pk_bytes = proving_key_bytes.len(),
        "Circuit setup complete"
    );

    Ok(GeneratedArtifacts {
        descriptor_json,
        proving_key_bytes,
        verifying_key_json,
        keys: CircuitKeys::from_parts(descriptor, proving_key, verifying_key)?,
    })
}

/// Where circuit artifacts come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactSource {
    Directory(PathBuf),
    /// Base URL; files are fetched as `<base>/<file>`.
    Remote(String),
    /// In-process setup, for development and tests.
    Ephemeral,
}

impl fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(dir) => write!(f, "dir:{}", dir.display()),
            Self::Remote(url) => write!(f, "{}", url),
            Self::Ephemeral => write!(f, "ephemeral"),
        }
    }
}

impl ArtifactSource {
    async fn fetch(&self, kind: CircuitKind, file: &str) -> ZkYieldResult<Vec<u8>> {
        match self {
            Self::Directory(dir) => {
                let path = dir.join(file);
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| unavailable(kind, format!("{}: {}", path.display(), e)))
            }
            Self::Remote(base) => {
                let url = format!("{}/{}", base.trim_end_matches('/'), file);
                let response = reqwest::get(&url)
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| unavailable(kind, format!("{}: {}", url, e)))?;
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| unavailable(kind, format!("{}: {}", url, e)))?;
                Ok(bytes.to_vec())
            }
            Self::Ephemeral => Err(unavailable(kind, "ephemeral source has no files")),
        }
    }
}

/// Lazily loaded keys, one slot per circuit kind.
pub struct ArtifactStore {
    source: ArtifactSource,
    kyc: OnceCell<Arc<CircuitKeys>>,
    balance: OnceCell<Arc<CircuitKeys>>,
}

impl ArtifactStore {
    pub fn new(source: ArtifactSource) -> Self {
        Self {
            source,
            kyc: OnceCell::new(),
            balance: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &ArtifactSource {
        &self.source
    }

    pub fn is_loaded(&self, kind: CircuitKind) -> bool {
        self.slot(kind).initialized()
    }

    fn slot(&self, kind: CircuitKind) -> &OnceCell<Arc<CircuitKeys>> {
        match kind {
            CircuitKind::Kyc => &self.kyc,
            CircuitKind::Balance => &self.balance,
        }
    }

    pub async fn keys(&self, kind: CircuitKind) -> ZkYieldResult<Arc<CircuitKeys>> {
        self.slot(kind)
            .get_or_try_init(|| self.load(kind))
            .await
            .cloned()
    }

    async fn load(&self, kind: CircuitKind) -> ZkYieldResult<Arc<CircuitKeys>> {
        info!(circuit = %kind, source = %self.source, "Loading circuit artifacts");

        let keys = match &self.source {
            ArtifactSource::Ephemeral => {
                tokio::task::spawn_blocking(move || setup_circuit(kind).map(|g| g.keys))
                    .await
                    .map_err(|e| ZkYieldError::Internal(format!("Setup task failed: {}", e)))??
            }
            source => {
                let descriptor = source.fetch(kind, &descriptor_file(kind)).await?;
                let proving_key = source.fetch(kind, &proving_key_file(kind)).await?;
                let verifying_key = source.fetch(kind, &verifying_key_file(kind)).await?;
                tokio::task::spawn_blocking(move || {
                    CircuitKeys::from_files(kind, &descriptor, &proving_key, &verifying_key)
                })
                .await
                .map_err(|e| ZkYieldError::Internal(format!("Artifact parsing failed: {}", e)))??
            }
        };

        info!(
            circuit = %kind,
            constraints = keys.descriptor.num_constraints,
            vk_hash = %keys.descriptor.verifying_key_hash,
            "Circuit artifacts loaded"
        );
        Ok(Arc::new(keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vk_json_roundtrip() {
        let generated = setup_circuit(CircuitKind::Kyc).unwrap();
        let json = VerifyingKeyJson::from_ark(&generated.keys.verifying_key);
        assert_eq!(json.n_public, 2);
        assert_eq!(json.ic.len(), 3);
        assert_eq!(json.vk_beta_2[2], ["1".to_string(), "0".to_string()]);
        assert_eq!(json.to_ark().unwrap(), generated.keys.verifying_key);
    }

    #[test]
    fn test_files_roundtrip_and_tamper_detection() {
        let generated = setup_circuit(CircuitKind::Balance).unwrap();
        let keys = CircuitKeys::from_files(
            CircuitKind::Balance,
            &generated.descriptor_json,
            &generated.proving_key_bytes,
            &generated.verifying_key_json,
        )
        .unwrap();
        assert_eq!(keys.descriptor, generated.keys.descriptor);

        let wrong_kind = CircuitKeys::from_files(
            CircuitKind::Kyc,
            &generated.descriptor_json,
            &generated.proving_key_bytes,
            &generated.verifying_key_json,
        );
        assert!(matches!(wrong_kind, Err(ZkYieldError::ProofGeneration(_))));

        let mut tampered = generated.verifying_key_json.clone();
        tampered.push(b'\n');
        let result = CircuitKeys::from_files(
            CircuitKind::Balance,
            &generated.descriptor_json,
            &generated.proving_key_bytes,
            &tampered,
        );
        assert!(matches!(result, Err(ZkYieldError::ProofGeneration(_))));
    }

    #[test]
    fn test_constraint_count_is_stable() {
        let first = constraint_count(CircuitKind::Kyc).unwrap();
        assert!(first > 0);
        assert_eq!(first, constraint_count(CircuitKind::Kyc).unwrap());
    }

    #[tokio::test]
    async fn test_directory_source_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        setup_circuit(CircuitKind::Kyc).unwrap().write_to(dir.path()).unwrap();

        let store = ArtifactStore::new(ArtifactSource::Directory(dir.path().to_path_buf()));
        assert!(!store.is_loaded(CircuitKind::Kyc));
        let first = store.keys(CircuitKind::Kyc).await.unwrap();
        let second = store.keys(CircuitKind::Kyc).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(store.is_loaded(CircuitKind::Kyc));
    }

    #[tokio::test]
    async fn test_missing_artifacts_are_proof_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(ArtifactSource::Directory(dir.path().to_path_buf()));
        let err = store.keys(CircuitKind::Balance).await.err().unwrap();
        assert!(matches!(err, ZkYieldError::ProofGeneration(_)));
        assert!(!store.is_loaded(CircuitKind::Balance));
    }
}
