use anyhow::Context;
use axum::Router;
use clap::Parser;
use semcoreproxy::config::{self, ConfigOverrides};
use semcoreproxy::logging;
use semcoreproxy::semantic_core::{SemanticCoreApi, SemanticCoreModule, SemanticCoreModuleConfig};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// REST proxy in front of the semantic core document service.
#[derive(Debug, Parser)]
#[command(name = "semcore-proxy", version, about)]
struct Cli {
    /// Semantic core base URL (overrides SEMANTIC_CORE_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,
    /// Upstream call deadline in milliseconds (overrides SEMANTIC_CORE_TIMEOUT_MS).
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Mount point for the document routes (overrides SEMANTIC_CORE_ROUTE_PREFIX).
    #[arg(long)]
    route_prefix: Option<String>,
    /// Port to listen on (overrides SERVER_PORT).
    #[arg(long)]
    port: Option<u16>,
    /// Check upstream health, print the result and exit.
    #[arg(long)]
    probe: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
            route_prefix: self.route_prefix.clone(),
            server_port: self.port,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();
    let config = config::init_config_with(&cli.overrides()).context("Failed to load configuration")?;

    let module = SemanticCoreModule::create(&SemanticCoreModuleConfig::from(config))
        .context("Failed to build semantic core module")?;

    if cli.probe {
        let status = module
            .service()
            .probe_health()
            .await
            .context("Semantic core health probe failed")?;
        println!("{status}");
        return Ok(());
    }

    match module.service().probe_health().await {
        Ok(status) => tracing::info!(%status, "Semantic core reachable"),
        Err(err) => tracing::warn!(error = %err, "Semantic core health probe failed; serving anyway"),
    }

    let app = module
        .register(Router::new())
        .layer(TraceLayer::new_for_http());

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("Failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn bind_listener(preferred: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = preferred {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 4100..=4199;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 4100-4199",
    ))
}
