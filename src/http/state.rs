use std::sync::Arc;

use crate::services::{self, ServiceRouter};
use crate::upnp::{DeviceDescription, ParseError};

/// Shared application state injected into all route handlers via axum::extract::State.
/// Built once at startup, then read-only for the server lifetime.
#[derive(Clone)]
pub struct AppState {
    pub device: Arc<DeviceDescription>,
    pub router: Arc<ServiceRouter>,
}

impl AppState {
    pub fn new(device: Arc<DeviceDescription>, router: ServiceRouter) -> Self {
        AppState {
            device,
            router: Arc::new(router),
        }
    }

    /// MediaServer device with the built-in services wired up.
    pub fn media_server(device: Arc<DeviceDescription>) -> Result<Self, ParseError> {
        let router = services::media_server_router(Arc::clone(&device))?;
        Ok(Self::new(device, router))
    }
}
