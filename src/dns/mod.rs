mod ns1;
mod provider;

pub use ns1::{Ns1Provider, NS1_API_BASE};
pub use provider::{
    Credentials, DnsProvider, DnsRecord, ProviderError, ProviderResult, CHALLENGE_TTL, TXT,
};

use std::sync::Arc;

/// Builds provider clients for a set of credentials.
pub trait ProviderFactory: Send + Sync {
    fn create_provider(&self, credentials: &Credentials) -> ProviderResult<Arc<dyn DnsProvider>>;
}

pub struct Ns1ProviderFactory;

impl ProviderFactory for Ns1ProviderFactory {
    fn create_provider(&self, credentials: &Credentials) -> ProviderResult<Arc<dyn DnsProvider>> {
        Ok(Arc::new(Ns1Provider::new(credentials)?))
    }
}
