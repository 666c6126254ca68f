//! Demo gateway binary over an in-process loopback transport.

use anyhow::Result;

use gateway_server::app;
use gateway_transport::PipelineSettings;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = PipelineSettings::from_env()?;
    app::run(settings)
}
