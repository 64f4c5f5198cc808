//! # FX Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the in-memory repository
//! - Create the FX service with its simulation policy
//! - Start the HTTP server

mod config;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fx_hex::{FxService, Quiet, inbound::HttpServer};
use fx_repo::build_repo;

const DEFAULT_LOG_FILTER: &str = "info,fx_hex=debug,fx_app=debug";

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = config::Config::from_env()?;
    init_tracing(config.json_logs);

    tracing::info!("Starting FX server on port {}", config.port);
    tracing::info!(
        simulate = config.simulate,
        quote_ttl_secs = config.fx.quote_ttl.num_seconds(),
        fee_rate = config.fx.fees.rate,
        minimum_fee = config.fx.fees.minimum,
        "service configuration"
    );

    let service = FxService::new(build_repo(), config.fx);
    let service = if config.simulate {
        service
    } else {
        tracing::info!("Network simulation disabled");
        service.with_policy(Quiet)
    };

    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    Ok(())
}
