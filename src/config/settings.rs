use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

/// Process-level settings, read once at startup.
#[derive(Debug, Clone, Parser)]
#[command(name = "ns1-webhook")]
#[command(about = "cert-manager ACME DNS-01 webhook solver for NS1")]
#[command(version)]
pub struct Settings {
    /// API group the webhook is registered under with cert-manager
    #[arg(long, env = "GROUP_NAME")]
    pub group_name: String,

    /// Address the webhook server listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8443")]
    pub listen_addr: SocketAddr,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// PEM certificate chain served to the kube-apiserver
    #[arg(long, env = "TLS_CERT_FILE")]
    pub tls_cert_file: Option<PathBuf>,

    /// PEM private key matching the serving certificate
    #[arg(long, env = "TLS_PRIVATE_KEY_FILE")]
    pub tls_private_key_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.group_name.trim().is_empty() {
            bail!("GROUP_NAME must be specified");
        }
        if self.tls_cert_file.is_some() != self.tls_private_key_file.is_some() {
            bail!("TLS_CERT_FILE and TLS_PRIVATE_KEY_FILE must be set together");
        }
        Ok(())
    }

    /// Certificate and key paths, `None` when serving plain HTTP.
    pub fn tls_files(&self) -> Option<(&Path, &Path)> {
        match (&self.tls_cert_file, &self.tls_private_key_file) {
            (Some(cert), Some(key)) => Some((cert.as_path(), key.as_path())),
            _ => None,
        }
    }
}
