use crate::services::args::Arguments;
use crate::services::{output, ActionOutput, ServiceHandler};
use crate::upnp::{HandlerError, UpnpError};

pub const SERVICE_TYPE: &str = "ConnectionManager";

/// MIME types offered in `GetProtocolInfo`.
pub const SOURCE_MIMES: &[&str] = &[
    "video/mp4",
    "video/x-matroska",
    "video/x-msvideo",
    "video/mpeg",
    "video/quicktime",
    "video/webm",
    "audio/mpeg",
    "audio/flac",
    "audio/mp4",
    "audio/x-wav",
    "audio/ogg",
    "image/jpeg",
    "image/png",
    "image/gif",
];

/// Source protocol info: `http-get:*:<mime>:*` per MIME type, comma separated.
pub fn source_protocol_info() -> String {
    SOURCE_MIMES
        .iter()
        .map(|mime| format!("http-get:*:{mime}:*"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Output-only ConnectionManager with the single implicit connection 0.
pub struct ConnectionManager;

#[async_trait::async_trait]
impl ServiceHandler for ConnectionManager {
    async fn handle(&self, action: &str, args_xml: &str) -> Result<ActionOutput, HandlerError> {
        match action {
            "GetProtocolInfo" => Ok(output(&[
                ("Source", source_protocol_info()),
                ("Sink", String::new()),
            ])),
            "GetCurrentConnectionIDs" => Ok(output(&[("ConnectionIDs", "0".to_string())])),
            "GetCurrentConnectionInfo" => {
                Arguments::parse(args_xml)?.require("ConnectionID")?;
                Ok(output(&[
                    ("RcsID", "-1".to_string()),
                    ("AVTransportID", "-1".to_string()),
                    ("ProtocolInfo", String::new()),
                    ("PeerConnectionManager", String::new()),
                    ("PeerConnectionID", "-1".to_string()),
                    ("Direction", "Output".to_string()),
                    ("Status", "OK".to_string()),
                ]))
            }
            _ => {
                tracing::warn!("Unknown CMS action: {}", action);
                Err(UpnpError::invalid_action().into())
            }
        }
    }
}
