use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZkYieldError {
    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Proof generation failed: {0}")]
    ProofGeneration(String),

    #[error("Proof generation timed out after {0}s")]
    ProofTimeout(u64),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Request already in flight: {0}")]
    Busy(String),

    #[error("Chain error: {0}")]
    Chain(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse grouping used when reporting an error to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Fix the input and try again.
    Input,
    /// Proof state was reset; generation may be retried.
    Proof,
    /// Proof (if any) is retained; submission may be retried.
    Transaction,
    /// Environment or programming error outside the current attempt.
    System,
}

impl ZkYieldError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InputValidation(_) | Self::Busy(_) => ErrorCategory::Input,
            Self::ProofGeneration(_) | Self::ProofTimeout(_) => ErrorCategory::Proof,
            Self::Transaction(_) | Self::Chain(_) => ErrorCategory::Transaction,
            Self::Config(_) | Self::Serialization(_) | Self::Internal(_) => ErrorCategory::System,
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self.category(), ErrorCategory::System)
    }
}

pub type ZkYieldResult<T> = Result<T, ZkYieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ZkYieldError::InputValidation("empty name".into()).category(),
            ErrorCategory::Input
        );
        assert_eq!(ZkYieldError::ProofTimeout(60).category(), ErrorCategory::Proof);
        assert_eq!(
            ZkYieldError::Transaction("reverted".into()).category(),
            ErrorCategory::Transaction
        );
        assert!(!ZkYieldError::Config("bad".into()).is_retryable());
        assert!(ZkYieldError::Busy("proof".into()).is_retryable());
    }

    #[test]
    fn test_timeout_message_is_distinct() {
        let timeout = ZkYieldError::ProofTimeout(60).to_string();
        let failure = ZkYieldError::ProofGeneration("unsatisfied".into()).to_string();
        assert_eq!(timeout, "Proof generation timed out after 60s");
        assert_ne!(timeout, failure);
    }
}
