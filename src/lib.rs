//! cert-manager ACME DNS-01 webhook solver for NS1.
//!
//! The solver resolves an NS1 API key from a Kubernetes Secret and
//! creates or deletes the `_acme-challenge` TXT record for a challenge.

pub mod config;
pub mod dns;
pub mod secrets;
pub mod solver;
pub mod webhook;
