use async_trait::async_trait;
use thiserror::Error;

/// The only record type this solver manages.
pub const TXT: &str = "TXT";

/// TTL applied to every challenge record.
pub const CHALLENGE_TTL: u32 = 3600;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("record not found")]
    NotFound,

    #[error("NS1 API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to send request to NS1 API: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound)
    }
}

/// Credentials a provider client is bound to.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credentials {
    pub api_key: String,
    pub api_url: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub zone: String,
    pub name: String,
    pub record_type: String,
    pub ttl: u32,
    pub answers: Vec<String>,
}

impl DnsRecord {
    pub fn txt(zone: &str, name: &str, value: &str, ttl: u32) -> Self {
        Self {
            zone: zone.to_string(),
            name: name.to_string(),
            record_type: TXT.to_string(),
            ttl,
            answers: vec![value.to_string()],
        }
    }

    pub fn has_answer(&self, value: &str) -> bool {
        self.answers.iter().any(|a| a == value)
    }
}

#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch a record, `ProviderError::NotFound` when it does not exist
    async fn get_record(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
    ) -> ProviderResult<DnsRecord>;

    /// Create a new record
    async fn create_record(&self, record: &DnsRecord) -> ProviderResult<()>;

    /// Delete a record, `ProviderError::NotFound` when it does not exist
    async fn delete_record(&self, zone: &str, name: &str, record_type: &str)
        -> ProviderResult<()>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
