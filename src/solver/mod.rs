//! The cert-manager solver contract and its NS1 implementation.

mod ns1;
mod request;

pub use ns1::Ns1Solver;
pub use request::{ChallengeAction, ChallengeRequest};

use async_trait::async_trait;
use thiserror::Error;

use crate::dns::ProviderError;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Failed to initialize Kubernetes client: {0}")]
    Initialization(String),

    #[error("solver used before initialize was called")]
    NotInitialized,

    #[error("error decoding solver config: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    #[error("unable to get secret `{name}/{namespace}`: {reason}")]
    SecretNotFound {
        namespace: String,
        name: String,
        reason: String,
    },

    #[error("unable to get {key} from secret `{name}/{namespace}`")]
    MissingKey {
        namespace: String,
        name: String,
        key: String,
    },

    #[error("Failed to build NS1 client: {0}")]
    ClientBuild(#[source] ProviderError),

    #[error("Unable to {operation} TXT record zone={zone} recordName={name}: {source}")]
    ProviderApi {
        operation: &'static str,
        zone: String,
        name: String,
        #[source]
        source: ProviderError,
    },
}

/// Operations cert-manager drives a DNS-01 solver through.
#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    /// Identifier the solver is addressed by in issuer configuration
    fn name(&self) -> &'static str;

    /// Connect to the cluster. Must run once before present/clean_up.
    fn initialize(&mut self, cluster_config: kube::Config) -> Result<(), SolverError>;

    /// Ensure the challenge TXT record exists
    async fn present(&self, request: &ChallengeRequest) -> Result<(), SolverError>;

    /// Remove the challenge TXT record
    async fn clean_up(&self, request: &ChallengeRequest) -> Result<(), SolverError>;
}

/// Both resolved zone and FQDN end with a dot; NS1 names do not.
pub fn strip_trailing_dot(fqdn: &str) -> &str {
    fqdn.strip_suffix('.').unwrap_or(fqdn)
}
