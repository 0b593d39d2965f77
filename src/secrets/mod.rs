mod kube_store;

pub use kube_store::KubeSecretStore;

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

/// Key under which the NS1 API key is stored in the referenced Secret.
pub const API_KEY_FIELD: &str = "api-key";

pub type SecretData = BTreeMap<String, Vec<u8>>;

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the key/value data of a secret in a namespace
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData>;
}

/// Returns the field as a string, `None` when the key is absent.
pub fn string_from_secret_data(data: &SecretData, key: &str) -> Option<String> {
    data.get(key)
        .map(|bytes| String::from_utf8_lossy(bytes).trim_end_matches(['\n', '\r']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_from_secret_data() {
        let mut data = SecretData::new();
        data.insert("api-key".to_string(), b"k1".to_vec());

        assert_eq!(string_from_secret_data(&data, API_KEY_FIELD), Some("k1".to_string()));
        assert_eq!(string_from_secret_data(&data, "missing"), None);
    }

    #[test]
    fn test_string_from_secret_data_strips_trailing_newline() {
        let mut data = SecretData::new();
        data.insert("api-key".to_string(), b"k1\n".to_vec());

        assert_eq!(string_from_secret_data(&data, API_KEY_FIELD), Some("k1".to_string()));
    }
}
