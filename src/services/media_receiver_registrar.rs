//! `X_MS_MediaReceiverRegistrar`, which Xbox and Windows Media Player
//! clients require before they will browse. Every device is authorized.

use std::sync::Arc;

use crate::services::{output, ActionOutput, ServiceHandler};
use crate::upnp::{DeviceDescription, HandlerError, UpnpError};

pub const SERVICE_TYPE: &str = "X_MS_MediaReceiverRegistrar";

pub struct MediaReceiverRegistrar {
    device: Arc<DeviceDescription>,
}

impl MediaReceiverRegistrar {
    pub fn new(device: Arc<DeviceDescription>) -> Self {
        MediaReceiverRegistrar { device }
    }
}

#[async_trait::async_trait]
impl ServiceHandler for MediaReceiverRegistrar {
    async fn handle(&self, action: &str, _args_xml: &str) -> Result<ActionOutput, HandlerError> {
        match action {
            "IsAuthorized" | "IsValidated" => Ok(output(&[("Result", "1".to_string())])),
            "RegisterDevice" => Ok(output(&[("RegistrationRespMsg", self.device.uuid.clone())])),
            _ => Err(UpnpError::invalid_action().into()),
        }
    }
}
