use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ns1_webhook::{
    config::{LogFormat, Settings},
    solver::{ChallengeSolver, Ns1Solver},
    webhook,
};

fn init_logging(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();
    settings.validate()?;

    init_logging(&settings.log_level, settings.log_format);

    info!("Starting cert-manager webhook NS1");

    let cluster_config = kube::Config::infer()
        .await
        .context("Failed to load Kubernetes configuration")?;

    let mut solver = Ns1Solver::new();
    solver.initialize(cluster_config)?;

    webhook::run(&settings, Arc::new(solver)).await
}
