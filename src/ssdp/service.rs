use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::ssdp::engine::SsdpEngine;
use crate::ssdp::messages::Advertisement;
use crate::ssdp::socket::{self, AddressSource};

/// Configuration passed from main.rs to the SSDP service task.
pub struct SsdpConfig {
    pub advertisement: Arc<Advertisement>,
    /// Interface names to restrict SSDP to; empty means every usable one.
    pub interfaces: Vec<String>,
}

/// SSDP supervisor.
///
/// Lifecycle:
/// 1. Snapshot the usable interfaces; if none, log a warning and return.
/// 2. Start one engine per interface. A bind failure only loses that interface.
/// 3. Each engine serves until `shutdown` fires, then sends byebye and drains.
/// 4. Return once every engine has closed.
pub async fn run(config: SsdpConfig, source: &impl AddressSource, shutdown: CancellationToken) {
    let ifaces = match socket::select_interfaces(source, &config.interfaces) {
        Ok(ifaces) => ifaces,
        Err(e) => {
            tracing::warn!("SSDP: could not enumerate network interfaces: {}", e);
            return;
        }
    };
    if ifaces.is_empty() {
        tracing::warn!("SSDP: no usable network interfaces found; SSDP disabled, HTTP still works");
        return;
    }

    let mut engines = JoinSet::new();
    for iface in ifaces {
        let name = iface.name.clone();
        let engine = match SsdpEngine::init(
            iface.clone(),
            Arc::clone(&config.advertisement),
            shutdown.child_token(),
        ) {
            Ok(engine) => engine,
            Err(e) if !iface.expects_multicast() => {
                tracing::debug!("SSDP: {}: skipping: {}", name, e);
                continue;
            }
            Err(e) => {
                tracing::warn!("SSDP: {}: could not start: {}", name, e);
                continue;
            }
        };
        let kind = if iface.flags.loopback { "loopback" } else { "index" };
        tracing::info!("SSDP: started on {} ({} {})", name, kind, iface.index);
        engines.spawn(async move {
            engine.serve().await;
            engine.close().await;
        });
    }

    if engines.is_empty() {
        tracing::warn!("SSDP: no interface could join the multicast group; SSDP disabled");
        return;
    }

    while let Some(result) = engines.join_next().await {
        if let Err(e) = result {
            tracing::error!("SSDP: engine task failed: {}", e);
        }
    }
    tracing::info!("SSDP: byebye sent");
}
