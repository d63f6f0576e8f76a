//! # AutoGuard
//!
//! Cloaking gateway: per-request Money/Safe decisions under a hard
//! deadline, internal page dispatch, asynchronous decision logging and a
//! durable page-generation pipeline.

mod bootstrap;
mod di;

use autoguard_application::ports::JobQueue;
use autoguard_domain::CliOverrides;
use clap::{Parser, ValueEnum};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RunMode {
    /// Gateway and background workers in one process.
    All,
    /// HTTP gateway only.
    Gateway,
    /// Background workers only (log writer, page worker, mover, metrics).
    Worker,
}

#[derive(Parser)]
#[command(name = "autoguard")]
#[command(about = "Cloaking gateway with layered visitor detection")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Gateway port
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// SQLite database path
    #[arg(long)]
    database: Option<String>,

    /// Redis URL for the shared cache and queues
    #[arg(long)]
    redis_url: Option<String>,

    /// Root directory of the generated static pages
    #[arg(long)]
    page_root: Option<String>,

    #[arg(long, value_enum, default_value_t = RunMode::All)]
    mode: RunMode,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        gateway_port: cli.port,
        bind_address: cli.bind.clone(),
        database_path: cli.database.clone(),
        redis_url: cli.redis_url.clone(),
        page_root: cli.page_root.clone(),
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);
    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        gateway_port = config.server.gateway_port,
        bind = %config.server.bind_address,
        page_root = %config.server.page_root,
        decision_timeout_ms = config.cloak.decision_timeout_ms,
        mode = ?cli.mode,
        "Configuration loaded"
    );

    let core = di::Core::assemble(&config).await?;
    let shutdown = CancellationToken::new();

    let run_workers = matches!(cli.mode, RunMode::All | RunMode::Worker);
    let run_gateway = matches!(cli.mode, RunMode::All | RunMode::Gateway);

    if run_workers {
        core.start_jobs(&config, shutdown.clone()).await;
    }

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            shutdown.cancel();
        });
    }

    if run_gateway {
        let addr: SocketAddr =
            format!("{}:{}", config.server.bind_address, config.server.gateway_port).parse()?;
        let router = autoguard_gateway::create_router(core.app_state.clone());

        info!(%addr, "Gateway listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let serve_shutdown = shutdown.clone();
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { serve_shutdown.cancelled().await })
        .await?;
    } else {
        shutdown.cancelled().await;
    }

    if run_workers {
        drain_in_flight(core.job_queue.as_ref(), config.jobs.shutdown_grace_secs).await;
    }

    info!("AutoGuard stopped");
    Ok(())
}

/// Wait (bounded) for in-flight jobs to leave the processing list so a
/// deploy does not abandon work mid-render. Abandoned jobs would still be
/// recovered at next startup; this just makes the common case clean.
async fn drain_in_flight(queue: &dyn JobQueue, grace_secs: u64) {
    let deadline = Instant::now() + Duration::from_secs(grace_secs);
    loop {
        match queue.depths().await {
            Ok(depths) if depths.processing == 0 => {
                info!("All in-flight jobs drained");
                return;
            }
            Ok(depths) if Instant::now() >= deadline => {
                warn!(
                    in_flight = depths.processing,
                    "Shutdown grace elapsed with jobs still in flight"
                );
                return;
            }
            Ok(_) => tokio::time::sleep(Duration::from_millis(500)).await,
            Err(e) => {
                warn!(error = %e, "Could not sample queue depths during drain");
                return;
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
