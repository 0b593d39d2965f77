use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{Credentials, DnsProvider, DnsRecord, ProviderError, ProviderResult};

pub const NS1_API_BASE: &str = "https://api.nsone.net/v1/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const API_KEY_HEADER: &str = "X-NSONE-Key";

pub struct Ns1Provider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Ns1Record {
    zone: String,
    domain: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    ttl: u32,
    #[serde(default)]
    answers: Vec<Ns1Answer>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Ns1Answer {
    answer: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Ns1Error {
    message: String,
}

impl From<&DnsRecord> for Ns1Record {
    fn from(record: &DnsRecord) -> Self {
        Self {
            zone: record.zone.clone(),
            domain: record.name.clone(),
            record_type: record.record_type.clone(),
            ttl: record.ttl,
            answers: record
                .answers
                .iter()
                .map(|a| Ns1Answer {
                    answer: vec![a.clone()],
                })
                .collect(),
        }
    }
}

impl From<Ns1Record> for DnsRecord {
    fn from(record: Ns1Record) -> Self {
        Self {
            zone: record.zone,
            name: record.domain,
            record_type: record.record_type,
            ttl: record.ttl,
            // TXT answers carry a single rdata field each
            answers: record
                .answers
                .into_iter()
                .filter_map(|a| a.answer.into_iter().next())
                .collect(),
        }
    }
}

impl Ns1Provider {
    pub fn new(credentials: &Credentials) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        let base_url = match credentials.api_url.as_deref() {
            Some(url) if !url.trim().is_empty() => normalize_base_url(url),
            _ => NS1_API_BASE.to_string(),
        };

        Ok(Self {
            client,
            base_url,
            api_key: credentials.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn record_url(&self, zone: &str, name: &str, record_type: &str) -> String {
        format!("{}zones/{}/{}/{}", self.base_url, zone, name, record_type)
    }
}

fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}

async fn check_status(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Ns1Error>(&body)
        .map(|e| e.message)
        .unwrap_or(body);

    Err(ProviderError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DnsProvider for Ns1Provider {
    async fn get_record(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
    ) -> ProviderResult<DnsRecord> {
        let url = self.record_url(zone, name, record_type);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let record: Ns1Record = check_status(response).await?.json().await?;

        Ok(record.into())
    }

    async fn create_record(&self, record: &DnsRecord) -> ProviderResult<()> {
        let url = self.record_url(&record.zone, &record.name, &record.record_type);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Ns1Record::from(record))
            .send()
            .await?;

        check_status(response).await?;

        Ok(())
    }

    async fn delete_record(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
    ) -> ProviderResult<()> {
        let url = self.record_url(zone, name, record_type);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        check_status(response).await?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "ns1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(api_url: Option<&str>) -> Credentials {
        Credentials {
            api_key: "test_key".to_string(),
            api_url: api_url.map(str::to_string),
        }
    }

    #[test]
    fn test_default_base_url() {
        let provider = Ns1Provider::new(&credentials(None)).unwrap();
        assert_eq!(provider.base_url(), NS1_API_BASE);

        let provider = Ns1Provider::new(&credentials(Some(""))).unwrap();
        assert_eq!(provider.base_url(), NS1_API_BASE);
    }

    #[test]
    fn test_base_url_override_is_normalized() {
        let provider = Ns1Provider::new(&credentials(Some("https://ns1.internal/v1"))).unwrap();
        assert_eq!(provider.base_url(), "https://ns1.internal/v1/");

        let provider = Ns1Provider::new(&credentials(Some("https://ns1.internal/v1//"))).unwrap();
        assert_eq!(provider.base_url(), "https://ns1.internal/v1/");
    }

    #[test]
    fn test_record_url() {
        let provider = Ns1Provider::new(&credentials(None)).unwrap();
        assert_eq!(
            provider.record_url("example.com", "_acme-challenge.example.com", "TXT"),
            "https://api.nsone.net/v1/zones/example.com/_acme-challenge.example.com/TXT"
        );
    }

    #[test]
    fn test_ns1_record_serialization() {
        let record = DnsRecord::txt("example.com", "_acme-challenge.example.com", "abc123", 3600);

        let json = serde_json::to_value(Ns1Record::from(&record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "zone": "example.com",
                "domain": "_acme-challenge.example.com",
                "type": "TXT",
                "ttl": 3600,
                "answers": [{ "answer": ["abc123"] }]
            })
        );
    }

    #[test]
    fn test_ns1_record_deserialization_ignores_extra_fields() {
        let json = r#"{
            "id": "5c7f1a2b",
            "zone": "example.com",
            "domain": "_acme-challenge.example.com",
            "type": "TXT",
            "ttl": 3600,
            "tier": 1,
            "answers": [{ "id": "a1", "answer": ["abc123"] }, { "answer": ["def456"] }]
        }"#;

        let record: DnsRecord = serde_json::from_str::<Ns1Record>(json).unwrap().into();
        assert_eq!(record.name, "_acme-challenge.example.com");
        assert_eq!(record.answers, vec!["abc123", "def456"]);
    }
}
