use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client, Config};
use tracing::debug;

use super::{SecretData, SecretStore};

/// Reads Secrets from the Kubernetes API.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData> {
        debug!("Fetching secret {}/{}", namespace, name);

        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api
            .get_opt(name)
            .await
            .with_context(|| format!("Failed to read secret {}/{}", namespace, name))?
            .ok_or_else(|| anyhow!("secret {}/{} does not exist", namespace, name))?;

        let mut data: SecretData = secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, v.0))
            .collect();

        // stringData is normally folded into data by the API server
        for (k, v) in secret.string_data.unwrap_or_default() {
            data.entry(k).or_insert_with(|| v.into_bytes());
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use http::{Request, Response, StatusCode};
    use hyper::Body;
    use serde_json::{json, Value};
    use tower::service_fn;

    const SECRET_PATH: &str = "/api/v1/namespaces/ns/secrets/ns1-credentials";

    /// A client whose API server answers the secret path with `status`/`body`.
    fn client_serving(status: StatusCode, body: Value) -> Client {
        let service = service_fn(move |req: Request<Body>| {
            let (status, body) = if req.uri().path() == SECRET_PATH {
                (status, body.clone())
            } else {
                (StatusCode::NOT_FOUND, api_status(404, "NotFound", "unexpected path"))
            };
            async move {
                Ok::<_, Infallible>(
                    Response::builder()
                        .status(status)
                        .header("content-type", "application/json")
                        .body(Body::from(body.to_string()))
                        .unwrap(),
                )
            }
        });
        Client::new(service, "default")
    }

    fn api_status(code: u16, reason: &str, message: &str) -> Value {
        json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": message,
            "reason": reason,
            "code": code
        })
    }

    #[tokio::test]
    async fn test_get_secret_decodes_data() {
        let client = client_serving(
            StatusCode::OK,
            json!({
                "apiVersion": "v1",
                "kind": "Secret",
                "metadata": { "name": "ns1-credentials", "namespace": "ns" },
                "type": "Opaque",
                // "k1" and "eu-west"
                "data": { "api-key": "azE=", "region": "ZXUtd2VzdA==" }
            }),
        );

        let data = KubeSecretStore::new(client)
            .get_secret("ns", "ns1-credentials")
            .await
            .unwrap();

        assert_eq!(data.get("api-key"), Some(&b"k1".to_vec()));
        assert_eq!(data.get("region"), Some(&b"eu-west".to_vec()));
    }

    #[tokio::test]
    async fn test_string_data_does_not_override_data() {
        let client = client_serving(
            StatusCode::OK,
            json!({
                "apiVersion": "v1",
                "kind": "Secret",
                "metadata": { "name": "ns1-credentials", "namespace": "ns" },
                "data": { "api-key": "azE=" },
                "stringData": { "api-key": "stale", "zone": "example.com" }
            }),
        );

        let data = KubeSecretStore::new(client)
            .get_secret("ns", "ns1-credentials")
            .await
            .unwrap();

        assert_eq!(data.get("api-key"), Some(&b"k1".to_vec()));
        assert_eq!(data.get("zone"), Some(&b"example.com".to_vec()));
    }

    #[tokio::test]
    async fn test_missing_secret() {
        let client = client_serving(
            StatusCode::NOT_FOUND,
            api_status(404, "NotFound", "secrets \"ns1-credentials\" not found"),
        );

        let err = KubeSecretStore::new(client)
            .get_secret("ns", "ns1-credentials")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "secret ns/ns1-credentials does not exist");
    }

    #[tokio::test]
    async fn test_forbidden_secret() {
        let client = client_serving(
            StatusCode::FORBIDDEN,
            api_status(403, "Forbidden", "secrets \"ns1-credentials\" is forbidden"),
        );

        let err = KubeSecretStore::new(client)
            .get_secret("ns", "ns1-credentials")
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.starts_with("Failed to read secret ns/ns1-credentials"));
        assert!(message.contains("forbidden"));
    }
}
