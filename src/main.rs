// math-advisor - Solve photographed math problems with Gemini
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use math_advisor::cli::{self, Args, Command};
use math_advisor::config::AppConfig;
use math_advisor::gemini::GeminiClient;
use math_advisor::server::create_router;
use math_advisor::solver::Solver;
use math_advisor::utils::logging;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load_from(args.config.as_deref())?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting math-advisor v{}", env!("CARGO_PKG_VERSION"));

    if !config.gemini.has_api_key() {
        warn!("No Gemini API key configured; set GOOGLE_API_KEY or gemini.api_key");
    }

    // Phase 3: Build the gateway with an explicit client
    let client = GeminiClient::new(&config.gemini)?;
    info!("Using model {} at {}", config.gemini.model, client.base_url());
    let solver = Solver::new(client);

    match args.command {
        Some(Command::Solve { path }) => {
            let text = cli::solve_file(&solver, &path).await?;
            println!("{}", text);
            Ok(())
        }
        Some(Command::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, solver).await
        }
        None => serve(config, solver).await,
    }
}

async fn serve(config: AppConfig, solver: Solver) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Phase 4: Build and start HTTP server
    let app = create_router(config, solver)?;

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 5: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
