use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeAction {
    Present,
    CleanUp,
}

/// A DNS-01 challenge as handed over by cert-manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(default)]
    pub uid: String,
    pub action: ChallengeAction,
    #[serde(default, rename = "type")]
    pub challenge_type: String,
    #[serde(default)]
    pub dns_name: String,
    pub key: String,
    pub resource_namespace: String,
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    pub resolved_zone: String,
    #[serde(default)]
    pub allow_ambient_credentials: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}
