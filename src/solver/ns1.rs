use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{strip_trailing_dot, ChallengeRequest, ChallengeSolver, SolverError};
use crate::config::{ProviderConfig, SolverConfig};
use crate::dns::{
    Credentials, DnsProvider, DnsRecord, Ns1ProviderFactory, ProviderError, ProviderFactory,
    CHALLENGE_TTL, TXT,
};
use crate::secrets::{string_from_secret_data, KubeSecretStore, SecretStore, API_KEY_FIELD};

const MAX_CACHED_PROVIDERS: usize = 16;

pub struct Ns1Solver {
    secrets: Option<Arc<dyn SecretStore>>,
    factory: Arc<dyn ProviderFactory>,
    // Keyed by credentials so a rotated API key gets a fresh client
    providers: Mutex<HashMap<Credentials, Arc<dyn DnsProvider>>>,
}

impl Default for Ns1Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Ns1Solver {
    pub fn new() -> Self {
        Self {
            secrets: None,
            factory: Arc::new(Ns1ProviderFactory),
            providers: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_secret_store(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn with_provider_factory(mut self, factory: Arc<dyn ProviderFactory>) -> Self {
        self.factory = factory;
        self
    }

    async fn provider_config(&self, ch: &ChallengeRequest) -> Result<ProviderConfig, SolverError> {
        let secrets = self.secrets.as_ref().ok_or(SolverError::NotInitialized)?;
        let config = SolverConfig::load(ch.config.as_ref())?;
        let namespace = ch.resource_namespace.as_str();
        let secret_ref = config.api_key_secret_ref.clone();

        let data = secrets
            .get_secret(namespace, &secret_ref)
            .await
            .map_err(|e| {
                error!("Unable to get secret {}/{}: {:#}", secret_ref, namespace, e);
                SolverError::SecretNotFound {
                    namespace: namespace.to_string(),
                    name: secret_ref.clone(),
                    reason: format!("{:#}", e),
                }
            })?;

        let api_key = string_from_secret_data(&data, API_KEY_FIELD).ok_or_else(|| {
            error!("Unable to get {} from secret {}/{}", API_KEY_FIELD, secret_ref, namespace);
            SolverError::MissingKey {
                namespace: namespace.to_string(),
                name: secret_ref.clone(),
                key: API_KEY_FIELD.to_string(),
            }
        })?;

        let mut config = ProviderConfig::new(config, api_key);
        if config.zone_name.is_empty() {
            config.zone_name = strip_trailing_dot(&ch.resolved_zone).to_string();
        }

        Ok(config)
    }

    fn provider_for(&self, config: &ProviderConfig) -> Result<Arc<dyn DnsProvider>, SolverError> {
        let credentials = Credentials {
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
        };

        let mut providers = self.providers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(provider) = providers.get(&credentials) {
            return Ok(Arc::clone(provider));
        }

        let provider = self
            .factory
            .create_provider(&credentials)
            .map_err(|e| {
                error!("Unable to build NS1 client for zone {}: {}", config.zone_name, e);
                SolverError::ClientBuild(e)
            })?;

        debug!("Built {} client for {:?}", provider.provider_name(), credentials);

        if providers.len() >= MAX_CACHED_PROVIDERS {
            providers.clear();
        }
        providers.insert(credentials, Arc::clone(&provider));

        Ok(provider)
    }

    async fn create_txt_record(
        &self,
        provider: &dyn DnsProvider,
        config: &ProviderConfig,
        ch: &ChallengeRequest,
    ) -> Result<(), SolverError> {
        let zone = config.zone_name.as_str();
        let name = strip_trailing_dot(&ch.resolved_fqdn);
        let api_error = |operation: &'static str, source: ProviderError| SolverError::ProviderApi {
            operation,
            zone: zone.to_string(),
            name: name.to_string(),
            source,
        };

        match provider.get_record(zone, name, TXT).await {
            Ok(existing) => {
                if existing.has_answer(&ch.key) {
                    info!("Already added TXT record: {}", name);
                } else {
                    warn!(
                        "TXT record {} already exists without the challenge key, leaving it unchanged",
                        name
                    );
                }
                Ok(())
            }
            Err(ProviderError::NotFound) => {
                let record = DnsRecord::txt(zone, name, &ch.key, CHALLENGE_TTL);
                provider.create_record(&record).await.map_err(|e| {
                    error!("Unable to create TXT record zone={} recordName={}: {}", zone, name, e);
                    api_error("create", e)
                })?;

                info!("Added TXT record: {}", name);
                Ok(())
            }
            Err(e) => {
                error!("Unable to look up TXT record zone={} recordName={}: {}", zone, name, e);
                Err(api_error("look up", e))
            }
        }
    }

    async fn delete_txt_record(
        &self,
        provider: &dyn DnsProvider,
        config: &ProviderConfig,
        ch: &ChallengeRequest,
    ) -> Result<(), SolverError> {
        let zone = config.zone_name.as_str();
        let name = strip_trailing_dot(&ch.resolved_fqdn);

        match provider.delete_record(zone, name, TXT).await {
            Ok(()) => {
                info!("Deleted TXT record: {}", name);
                Ok(())
            }
            Err(ProviderError::NotFound) => {
                info!("TXT record {} already absent", name);
                Ok(())
            }
            Err(e) => {
                error!("Unable to delete TXT record zone={} recordName={}: {}", zone, name, e);
                Err(SolverError::ProviderApi {
                    operation: "delete",
                    zone: zone.to_string(),
                    name: name.to_string(),
                    source: e,
                })
            }
        }
    }
}

#[async_trait]
impl ChallengeSolver for Ns1Solver {
    fn name(&self) -> &'static str {
        "ns1"
    }

    fn initialize(&mut self, cluster_config: kube::Config) -> Result<(), SolverError> {
        let store = KubeSecretStore::from_config(cluster_config)
            .map_err(|e| SolverError::Initialization(format!("{:#}", e)))?;
        self.secrets = Some(Arc::new(store));
        Ok(())
    }

    async fn present(&self, ch: &ChallengeRequest) -> Result<(), SolverError> {
        info!(
            "Present: namespace={} zone={} fqdn={}",
            ch.resource_namespace, ch.resolved_zone, ch.resolved_fqdn
        );

        let config = self.provider_config(ch).await?;
        let provider = self.provider_for(&config)?;
        self.create_txt_record(provider.as_ref(), &config, ch).await
    }

    async fn clean_up(&self, ch: &ChallengeRequest) -> Result<(), SolverError> {
        info!(
            "CleanUp: namespace={} zone={} fqdn={}",
            ch.resource_namespace, ch.resolved_zone, ch.resolved_fqdn
        );

        let config = self.provider_config(ch).await?;
        let provider = self.provider_for(&config)?;
        self.delete_txt_record(provider.as_ref(), &config, ch).await
    }
}
