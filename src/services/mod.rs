//! SOAP action handlers and the table routing control requests to them.

pub mod args;
pub mod connection_manager;
pub mod content_directory;
pub mod media_receiver_registrar;

use std::collections::HashMap;
use std::sync::Arc;

use crate::upnp::{DeviceDescription, HandlerError, ParseError, ServiceUrn, SoapAction, UpnpError};

/// Output arguments of an action, in the order they go on the wire.
pub type ActionOutput = Vec<(String, String)>;

/// Implementation of one UPnP service.
///
/// `args_xml` is the SOAP Body's inner XML, action element included; use
/// [`args::Arguments::parse`] to read the input arguments out of it.
#[async_trait::async_trait]
pub trait ServiceHandler: Send + Sync {
    async fn handle(&self, action: &str, args_xml: &str) -> Result<ActionOutput, HandlerError>;
}

/// Service type (the `type` segment of the URN) to handler.
///
/// Built once at startup and never changed afterwards.
#[derive(Clone, Default)]
pub struct ServiceRouter {
    handlers: HashMap<String, Arc<dyn ServiceHandler>>,
}

impl ServiceRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for the service type named by `service_urn`.
    pub fn with_handler(
        mut self,
        service_urn: &str,
        handler: Arc<dyn ServiceHandler>,
    ) -> Result<Self, ParseError> {
        let urn = ServiceUrn::parse(service_urn)?;
        self.handlers.insert(urn.service_type, handler);
        Ok(self)
    }

    pub fn from_handlers<'a>(
        handlers: impl IntoIterator<Item = (&'a str, Arc<dyn ServiceHandler>)>,
    ) -> Result<Self, ParseError> {
        handlers
            .into_iter()
            .try_fold(Self::new(), |router, (urn, handler)| router.with_handler(urn, handler))
    }

    /// Run `action` against the matching handler.
    ///
    /// An unknown service type is reported as 401; a handler error that is
    /// not already a UPnP error becomes 501 with its message.
    pub async fn dispatch(&self, action: &SoapAction, args_xml: &str) -> Result<ActionOutput, UpnpError> {
        let service_type = &action.urn.service_type;
        let Some(handler) = self.handlers.get(service_type) else {
            return Err(UpnpError::new(
                crate::upnp::error::INVALID_ACTION,
                format!("Invalid service: {service_type}"),
            ));
        };
        handler.handle(&action.action, args_xml).await.map_err(|e| {
            let err = UpnpError::from(e);
            tracing::debug!("SOAP: {} failed: {}", action, err);
            err
        })
    }
}

/// Router with the built-in MediaServer services.
pub fn media_server_router(device: Arc<DeviceDescription>) -> Result<ServiceRouter, ParseError> {
    let mut router = ServiceRouter::new();
    for service in &device.services {
        let handler: Arc<dyn ServiceHandler> = match ServiceUrn::parse(&service.service_type)?
            .service_type
            .as_str()
        {
            content_directory::SERVICE_TYPE => {
                Arc::new(content_directory::ContentDirectory::new(Arc::clone(&device)))
            }
            connection_manager::SERVICE_TYPE => Arc::new(connection_manager::ConnectionManager),
            media_receiver_registrar::SERVICE_TYPE => Arc::new(
                media_receiver_registrar::MediaReceiverRegistrar::new(Arc::clone(&device)),
            ),
            other => {
                tracing::warn!("SOAP: no built-in handler for service {}", other);
                continue;
            }
        };
        router = router.with_handler(&service.service_type, handler)?;
    }
    Ok(router)
}

pub(crate) fn output(pairs: &[(&str, String)]) -> ActionOutput {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}
