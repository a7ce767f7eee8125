mod args;

use anyhow::{Context, Result};
use clap::Parser;
use regimecast_core::app::build_server;
use regimecast_core::config::Config;
use regimecast_core::mcp::{HttpMcpServer, serve_stdio};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::{Args, Transport};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // stdout belongs to the protocol in stdio mode, so logs always go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load_from_env(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    for var in config.missing_credentials() {
        warn!("{} is not set; calls that need it will fail", var);
    }

    let server = build_server(&config)
        .await
        .context("Failed to initialize MCP server")?;

    match args.transport {
        Transport::Http => {
            let addr = config.listen_addr().await?;
            let http = HttpMcpServer::start(server, addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("MCP server ready at {}", http.url());

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            http.shutdown().await;
        }
        Transport::Stdio => {
            info!("MCP server ready on stdio");
            serve_stdio(server).await?;
        }
    }

    Ok(())
}
