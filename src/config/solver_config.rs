use serde::Deserialize;
use serde_json::Value;

/// Per-issuer configuration passed through by cert-manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverConfig {
    pub zone_name: String,
    pub api_url: String,
    pub api_key_secret_ref: String,
}

impl SolverConfig {
    /// Decode the raw blob. A missing or null blob yields the zero value.
    pub fn load(raw: Option<&Value>) -> Result<Self, serde_json::Error> {
        match raw {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => Self::deserialize(value),
        }
    }
}

/// Solver config with the API key resolved from its Secret.
#[derive(Clone)]
pub struct ProviderConfig {
    pub zone_name: String,
    pub api_url: Option<String>,
    pub api_key_secret_ref: String,
    pub api_key: String,
}

impl ProviderConfig {
    pub fn new(config: SolverConfig, api_key: String) -> Self {
        let api_url = Some(config.api_url).filter(|url| !url.trim().is_empty());
        Self {
            zone_name: config.zone_name,
            api_url,
            api_key_secret_ref: config.api_key_secret_ref,
            api_key,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("zone_name", &self.zone_name)
            .field("api_url", &self.api_url)
            .field("api_key_secret_ref", &self.api_key_secret_ref)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
