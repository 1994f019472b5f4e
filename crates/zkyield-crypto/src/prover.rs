use crate::artifacts::{ArtifactSource, ArtifactStore};
use crate::circuit::{AnyCircuit, CircuitInputs, CircuitKind};
use crate::credential::Credential;
use crate::field::FieldInt;
use crate::proof::Proof;
use ark_bn254::{Bn254, Fr};
use ark_groth16::Groth16;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_snark::SNARK;
use ark_std::rand::thread_rng;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use zkyield_types::{TokenAmount, ZkYieldError, ZkYieldResult};

/// The proving routine behind the generator. Implementations must be all
/// or nothing: either a proof over exactly the given public signals, or
/// an error.
#[async_trait]
pub trait ProvingBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn prove(&self, inputs: CircuitInputs) -> ZkYieldResult<Proof>;

    /// Checks a proof against the public signals it carries.
    async fn verify(&self, proof: &Proof) -> ZkYieldResult<bool>;
}

fn check_satisfied(circuit: AnyCircuit) -> ZkYieldResult<()> {
    let kind = circuit.kind();
    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit.generate_constraints(cs.clone()).map_err(|e| {
        ZkYieldError::ProofGeneration(format!("Constraint synthesis failed for {}: {}", kind, e))
    })?;
    let satisfied = cs
        .is_satisfied()
        .map_err(|e| ZkYieldError::ProofGeneration(e.to_string()))?;
    if !satisfied {
        let which = cs
            .which_is_unsatisfied()
            .ok()
            .flatten()
            .unwrap_or_else(|| "unknown".to_string());
        return Err(ZkYieldError::ProofGeneration(format!(
            "Inputs violate the {} circuit constraints (first failure: {})",
            kind, which
        )));
    }
    Ok(())
}

/// Groth16 over BN254 with lazily loaded artifacts.
pub struct Groth16Backend {
    store: ArtifactStore,
}

impl Groth16Backend {
    pub fn new(source: ArtifactSource) -> Self {
        Self {
            store: ArtifactStore::new(source),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }
}

#[async_trait]
impl ProvingBackend for Groth16Backend {
    fn name(&self) -> &'static str {
        "groth16-bn254"
    }

    async fn prove(&self, inputs: CircuitInputs) -> ZkYieldResult<Proof> {
        let kind = inputs.kind;
        let keys = self.store.keys(kind).await?;
        let public_signals = inputs.public_signals();

        let proof = tokio::task::spawn_blocking(move || {
            let circuit = inputs.into_circuit();
            check_satisfied(circuit.clone())?;
            let mut rng = thread_rng();
            Groth16::<Bn254>::prove(&keys.proving_key, circuit, &mut rng)
                .map_err(|e| ZkYieldError::ProofGeneration(format!("Prover failed: {}", e)))
        })
        .await
        .map_err(|e| ZkYieldError::Internal(format!("Prover task failed: {}", e)))??;

        Ok(Proof::from_ark(kind, &proof, public_signals))
    }

    async fn verify(&self, proof: &Proof) -> ZkYieldResult<bool> {
        if proof.public_signals.len() != proof.kind.num_public_inputs() {
            warn!(
                circuit = %proof.kind,
                signals = proof.public_signals.len(),
                "Public signal count mismatch"
            );
            return Ok(false);
        }
        let keys = self.store.keys(proof.kind).await?;
        let ark_proof = proof.to_ark()?;
        let inputs: Vec<Fr> = proof.public_signals.iter().map(FieldInt::to_fr).collect();

        tokio::task::spawn_blocking(move || {
            Groth16::<Bn254>::verify_with_processed_vk(&keys.prepared, &inputs, &ark_proof)
                .map_err(|e| ZkYieldError::ProofGeneration(format!("Verification failed: {}", e)))
        })
        .await
        .map_err(|e| ZkYieldError::Internal(format!("Verifier task failed: {}", e)))?
    }
}

/// A proof and the commitment it binds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedProof {
    pub proof: Proof,
    pub commitment: FieldInt,
}

#[derive(Clone)]
pub struct ProofGenerator {
    backend: Arc<dyn ProvingBackend>,
}

impl ProofGenerator {
    pub fn new(backend: Arc<dyn ProvingBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn ProvingBackend> {
        &self.backend
    }

    /// Commits to the credential, assembles the input record and hands it
    /// to the backend. Backend failures propagate unchanged.
    pub async fn generate_proof(
        &self,
        kind: CircuitKind,
        credential: &Credential,
        public_param: &FieldInt,
    ) -> ZkYieldResult<GeneratedProof> {
        let commitment = credential.commitment();
        let inputs = CircuitInputs {
            kind,
            credential_hash: credential.credential_hash(),
            salt: credential.salt(),
            jurisdiction_code: credential.jurisdiction_code(),
            public_param: public_param.clone(),
            commitment: commitment.clone(),
        };
        let expected_signals = inputs.public_signals();
        debug!(circuit = %kind, public_param = %public_param, commitment = %commitment, "Assembled circuit inputs");

        let started = Instant::now();
        let proof = self.backend.prove(inputs).await?;
        if proof.kind != kind || proof.public_signals != expected_signals {
            return Err(ZkYieldError::ProofGeneration(
                "Prover returned unexpected public signals".into(),
            ));
        }

        info!(
            circuit = %kind,
            backend = self.backend.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Proof generated"
        );
        Ok(GeneratedProof { proof, commitment })
    }

    pub async fn generate_kyc_proof(
        &self,
        credential: &Credential,
        allowed_jurisdiction: u64,
    ) -> ZkYieldResult<GeneratedProof> {
        self.generate_proof(
            CircuitKind::Kyc,
            credential,
            &FieldInt::from_u64(allowed_jurisdiction),
        )
        .await
    }

    pub async fn generate_balance_proof(
        &self,
        credential: &Credential,
        threshold: &TokenAmount,
    ) -> ZkYieldResult<GeneratedProof> {
        self.generate_proof(
            CircuitKind::Balance,
            credential,
            &FieldInt::from_u128(threshold.raw),
        )
        .await
    }

    pub async fn verify(&self, proof: &Proof) -> ZkYieldResult<bool> {
        self.backend.verify(proof).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::compute_commitment;
    use crate::format::format_for_contract;
    use std::sync::OnceLock;
    use zkyield_types::Jurisdiction;

    static GENERATOR: OnceLock<ProofGenerator> = OnceLock::new();

    // Shared so the ephemeral setup runs once per circuit for the whole module.
    fn generator() -> &'static ProofGenerator {
        GENERATOR.get_or_init(|| {
            ProofGenerator::new(Arc::new(Groth16Backend::new(ArtifactSource::Ephemeral)))
        })
    }

    #[tokio::test]
    async fn test_kyc_proof_generation_and_verification() {
        let generator = generator();
        let credential = Credential::mock_at("alice", Jurisdiction::Us, 1_733_400_000_000).unwrap();

        let generated = generator.generate_kyc_proof(&credential, 1).await.unwrap();
        assert_eq!(
            generated.commitment,
            compute_commitment(&credential.credential_hash(), &credential.salt())
        );
        assert_eq!(
            generated.proof.public_signals,
            vec![FieldInt::from_u64(1), generated.commitment.clone()]
        );
        assert!(generator.verify(&generated.proof).await.unwrap());
    }

    #[tokio::test]
    async fn test_fixture_credential_proves() {
        let generator = generator();
        let credential = Credential::new(&FieldInt::from_u64(12345), &FieldInt::from_u64(67890), 2);
        let generated = generator.generate_kyc_proof(&credential, 2).await.unwrap();
        // Value printed by the circuits' calculate_commitment script.
        assert_eq!(generated.commitment, FieldInt::from_u64(7275757275));
        assert!(generator.verify(&generated.proof).await.unwrap());
    }

    #[tokio::test]
    async fn test_tampered_signals_rejected() {
        let generator = generator();
        let credential = Credential::mock_at("bob", Jurisdiction::Eu, 1).unwrap();
        let generated = generator.generate_kyc_proof(&credential, 2).await.unwrap();

        let mut wrong_commitment = generated.proof.clone();
        wrong_commitment.public_signals[1] = generated.commitment.add(&FieldInt::from_u64(1));
        assert!(!generator.verify(&wrong_commitment).await.unwrap());

        let mut wrong_jurisdiction = generated.proof.clone();
        wrong_jurisdiction.public_signals[0] = FieldInt::from_u64(1);
        assert!(!generator.verify(&wrong_jurisdiction).await.unwrap());

        let mut truncated = generated.proof.clone();
        truncated.public_signals.pop();
        assert!(!generator.verify(&truncated).await.unwrap());
    }

    #[tokio::test]
    async fn test_formatted_proof_matches_restored_proof() {
        let generator = generator();
        let credential = Credential::mock_at("carol", Jurisdiction::Singapore, 7).unwrap();
        let generated = generator.generate_kyc_proof(&credential, 3).await.unwrap();

        let restored = Proof::from_base64(&generated.proof.to_base64().unwrap()).unwrap();
        assert!(generator.verify(&restored).await.unwrap());

        let formatted = format_for_contract(&restored);
        assert_eq!(formatted.b[0][0], restored.b[0][1]);
        assert_eq!(formatted.b[1][1], restored.b[1][0]);
    }

    #[tokio::test]
    async fn test_wrong_jurisdiction_is_proof_error() {
        let generator = generator();
        let credential = Credential::mock_at("dave", Jurisdiction::Eu, 1).unwrap();
        let err = generator.generate_kyc_proof(&credential, 1).await.unwrap_err();
        assert!(matches!(err, ZkYieldError::ProofGeneration(_)));
    }

    #[tokio::test]
    async fn test_wide_allowed_code_is_not_proven() {
        let generator = generator();
        let credential = Credential::new(&FieldInt::from_u64(12345), &FieldInt::from_u64(67890), 1);
        let wide = FieldInt::from_u128((1u128 << 64) + 1);

        let err = generator
            .generate_proof(CircuitKind::Kyc, &credential, &wide)
            .await
            .unwrap_err();
        assert!(matches!(err, ZkYieldError::ProofGeneration(_)));
    }

    #[tokio::test]
    async fn test_balance_proof() {
        let generator = generator();
        let minimum = TokenAmount::ether("0.001").unwrap();

        let rich = Credential::for_balance(&TokenAmount::ether("0.5").unwrap());
        let generated = generator.generate_balance_proof(&rich, &minimum).await.unwrap();
        assert_eq!(generated.proof.kind, CircuitKind::Balance);
        assert!(generator.verify(&generated.proof).await.unwrap());

        let poor = Credential::for_balance(&TokenAmount::ether("0.0001").unwrap());
        let err = generator.generate_balance_proof(&poor, &minimum).await.unwrap_err();
        assert!(matches!(err, ZkYieldError::ProofGeneration(_)));
    }

    #[tokio::test]
    async fn test_missing_artifacts_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ProofGenerator::new(Arc::new(Groth16Backend::new(
            ArtifactSource::Directory(dir.path().to_path_buf()),
        )));
        let credential = Credential::mock_at("erin", Jurisdiction::Us, 1).unwrap();
        let err = generator.generate_kyc_proof(&credential, 1).await.unwrap_err();
        assert!(matches!(err, ZkYieldError::ProofGeneration(msg) if msg.contains("unavailable")));
    }
}
