use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use dlnad::http::state::AppState;
use dlnad::ssdp::service::SsdpConfig;
use dlnad::ssdp::socket::SystemInterfaces;
use dlnad::ssdp::Advertisement;
use dlnad::upnp::DeviceDescription;
use dlnad::{cli, config, http, ssdp};

/// Set to true once the first Ctrl+C is received. Second Ctrl+C force-exits.
static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);

/// Wait for the first Ctrl+C (graceful shutdown).
/// A second Ctrl+C during the shutdown wait exits immediately.
async fn wait_for_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C: {}", e);
        return;
    }
    SHUTTING_DOWN.store(true, Ordering::SeqCst);
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() && SHUTTING_DOWN.load(Ordering::SeqCst) {
            eprintln!("\ndlnad: forced exit");
            std::process::exit(1);
        }
    });
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();

    let file_config = config::find_config_file(args.config.as_deref()).and_then(|path| {
        match config::load_config(&path) {
            Ok(cfg) => {
                tracing::debug!("Loaded config from {}", path.display());
                Some(cfg)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file: {}", e);
                None
            }
        }
    });

    let config = config::Config::resolve(file_config, &args);

    let device = Arc::new(DeviceDescription::media_server(&config.name));
    let state = match AppState::media_server(Arc::clone(&device)) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("error: invalid service table: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "dlnad \"{}\" ({}) on port {}",
        device.friendly_name,
        device.uuid,
        config.port
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("error: failed to bind {}: {}", addr, e);
            std::process::exit(1);
        });

    let shutdown = CancellationToken::new();

    // SSDP task: spawned after the HTTP listener is bound so LOCATION is live.
    let ssdp_config = SsdpConfig {
        advertisement: Arc::new(Advertisement::new(&device, config.port, config.notify_interval)),
        interfaces: config.interfaces.clone(),
    };
    let ssdp_shutdown = shutdown.clone();
    let ssdp_task = tokio::spawn(async move {
        ssdp::service::run(ssdp_config, &SystemInterfaces, ssdp_shutdown).await;
    });

    let app = http::build_router(state);
    let http_shutdown = shutdown.clone();
    let http_task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { http_shutdown.cancelled().await })
            .await
            .unwrap_or_else(|e| tracing::error!("HTTP server error: {}", e));
    });

    wait_for_shutdown().await;
    tracing::info!("Shutting down, sending SSDP byebye...");
    shutdown.cancel();

    let (ssdp_result, http_result) = tokio::join!(ssdp_task, http_task);
    for result in [ssdp_result, http_result] {
        if let Err(e) = result {
            tracing::error!("task failed during shutdown: {}", e);
        }
    }

    tracing::info!("Goodbye.");
}
