use std::sync::Arc;

use quick_xml::escape::escape;

use crate::services::args::Arguments;
use crate::services::{output, ActionOutput, ServiceHandler};
use crate::upnp::error::{ARGUMENT_VALUE_INVALID, NO_SUCH_OBJECT};
use crate::upnp::{DeviceDescription, HandlerError, UpnpError};

pub const SERVICE_TYPE: &str = "ContentDirectory";
pub const ROOT_ID: &str = "0";

/// ContentDirectory with nothing behind it: a root container and no children.
pub struct ContentDirectory {
    device: Arc<DeviceDescription>,
}

impl ContentDirectory {
    pub fn new(device: Arc<DeviceDescription>) -> Self {
        ContentDirectory { device }
    }

    /// Changes whenever the process restarts, so control points drop their caches.
    pub fn system_update_id() -> u32 {
        std::process::id()
    }

    fn browse(&self, args: &Arguments) -> Result<ActionOutput, HandlerError> {
        let object_id = args.require("ObjectID")?;
        let browse_flag = args.require("BrowseFlag")?;
        if object_id != ROOT_ID {
            tracing::debug!("Browse unknown ObjectID: {}", object_id);
            return Err(UpnpError::new(NO_SUCH_OBJECT, "No such object").into());
        }

        let (didl, returned, total) = match browse_flag {
            "BrowseDirectChildren" => (didl_lite_wrap(""), 0, 0),
            "BrowseMetadata" => {
                let root = container_element(ROOT_ID, "-1", &self.device.friendly_name, 0);
                (didl_lite_wrap(&root), 1, 1)
            }
            other => {
                tracing::debug!("Unknown BrowseFlag: {}", other);
                return Err(UpnpError::new(ARGUMENT_VALUE_INVALID, "Invalid BrowseFlag").into());
            }
        };

        Ok(output(&[
            ("Result", didl),
            ("NumberReturned", returned.to_string()),
            ("TotalMatches", total.to_string()),
            ("UpdateID", Self::system_update_id().to_string()),
        ]))
    }
}

#[async_trait::async_trait]
impl ServiceHandler for ContentDirectory {
    async fn handle(&self, action: &str, args_xml: &str) -> Result<ActionOutput, HandlerError> {
        match action {
            "GetSystemUpdateID" => Ok(output(&[("Id", Self::system_update_id().to_string())])),
            "GetSortCapabilities" => Ok(output(&[("SortCaps", "dc:title".to_string())])),
            "GetSearchCapabilities" => Ok(output(&[("SearchCaps", String::new())])),
            "Browse" => self.browse(&Arguments::parse(args_xml)?),
            _ => Err(UpnpError::invalid_action().into()),
        }
    }
}

/// DIDL-Lite root with the namespaces Samsung and LG clients insist on.
pub fn didl_lite_wrap(inner: &str) -> String {
    format!(
        r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/" xmlns:dlna="urn:schemas-dlna-org:metadata-1-0/">{inner}</DIDL-Lite>"#
    )
}

fn container_element(id: &str, parent_id: &str, title: &str, child_count: usize) -> String {
    format!(
        r#"<container id="{id}" parentID="{parent_id}" restricted="1" searchable="0" childCount="{child_count}"><dc:title>{title}</dc:title><upnp:class>object.container.storageFolder</upnp:class></container>"#,
        id = escape(id),
        parent_id = escape(parent_id),
        title = escape(title),
    )
}
