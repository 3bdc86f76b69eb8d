use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use uuid::Uuid;

use crate::upnp::scpd;

pub const ROOT_DESC_PATH: &str = "/rootDesc.xml";
/// Every service shares one control endpoint; routing happens on the SOAPACTION URN.
pub const CONTROL_PATH: &str = "/ctl";
pub const MEDIA_SERVER_DEVICE: &str = "urn:schemas-upnp-org:device:MediaServer:1";

pub const PRODUCT: &str = "dlnad";
pub const VERSION: &str = env!("DLNAD_VERSION");

/// Static entry of a device's service table.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSpec {
    pub service_type: &'static str,
    pub service_id: &'static str,
    pub event_sub_url: Option<&'static str>,
    pub scpd: &'static str,
}

pub const MEDIA_SERVER_SERVICES: &[ServiceSpec] = &[
    ServiceSpec {
        service_type: "urn:schemas-upnp-org:service:ContentDirectory:1",
        service_id: "urn:upnp-org:serviceId:ContentDirectory",
        event_sub_url: Some("/evt/ContentDirectory"),
        scpd: scpd::CONTENT_DIRECTORY,
    },
    ServiceSpec {
        service_type: "urn:schemas-upnp-org:service:ConnectionManager:1",
        service_id: "urn:upnp-org:serviceId:ConnectionManager",
        event_sub_url: None,
        scpd: scpd::CONNECTION_MANAGER,
    },
    ServiceSpec {
        service_type: "urn:microsoft.com:service:X_MS_MediaReceiverRegistrar:1",
        service_id: "urn:microsoft.com:serviceId:X_MS_MediaReceiverRegistrar",
        event_sub_url: None,
        scpd: scpd::MEDIA_RECEIVER_REGISTRAR,
    },
];

#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub service_type: String,
    pub service_id: String,
    pub control_url: String,
    pub event_sub_url: Option<String>,
    pub scpd_url: String,
    pub scpd: &'static str,
}

/// `/scpd/<last segment of the service ID>.xml`
pub fn scpd_url(service_id: &str) -> String {
    let tail = service_id.rsplit(':').next().unwrap_or(service_id);
    format!("/scpd/{tail}.xml")
}

/// Stable `uuid:` identifier derived from the friendly name alone, so a renamed
/// device shows up as a new one while restarts keep the same identity.
pub fn device_uuid(friendly_name: &str) -> String {
    let id = Uuid::new_v5(&Uuid::NAMESPACE_DNS, friendly_name.as_bytes());
    format!("uuid:{id}")
}

/// Value of the SSDP `SERVER` and HTTP `Server` headers.
pub fn server_banner() -> String {
    let os = std::env::consts::OS;
    let mut chars = os.chars();
    let os = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => "Unknown".to_string(),
    };
    format!("{os}/1.0 DLNADOC/1.50 UPnP/1.0 {PRODUCT}/{VERSION}")
}

/// Root device description plus everything derived from it.
///
/// Built once at startup and shared read-only by the HTTP front, the
/// service handlers and the SSDP engines.
#[derive(Debug, Clone)]
pub struct DeviceDescription {
    pub friendly_name: String,
    pub uuid: String,
    pub device_type: &'static str,
    pub services: Vec<ServiceDescriptor>,
    pub server: String,
    /// Process start, truncated to whole seconds for HTTP date comparisons.
    pub last_modified: DateTime<Utc>,
    root_xml: String,
}

impl DeviceDescription {
    pub fn build(
        friendly_name: &str,
        device_type: &'static str,
        specs: &[ServiceSpec],
        started: DateTime<Utc>,
    ) -> Self {
        let uuid = device_uuid(friendly_name);
        let services: Vec<ServiceDescriptor> = specs
            .iter()
            .map(|spec| ServiceDescriptor {
                service_type: spec.service_type.to_string(),
                service_id: spec.service_id.to_string(),
                control_url: CONTROL_PATH.to_string(),
                event_sub_url: spec.event_sub_url.map(str::to_string),
                scpd_url: scpd_url(spec.service_id),
                scpd: spec.scpd,
            })
            .collect();
        let root_xml = render_root(friendly_name, device_type, &uuid, &services);

        DeviceDescription {
            friendly_name: friendly_name.to_string(),
            uuid,
            device_type,
            services,
            server: server_banner(),
            last_modified: DateTime::from_timestamp(started.timestamp(), 0).unwrap_or(started),
            root_xml,
        }
    }

    pub fn media_server(friendly_name: &str) -> Self {
        Self::build(
            friendly_name,
            MEDIA_SERVER_DEVICE,
            MEDIA_SERVER_SERVICES,
            Utc::now(),
        )
    }

    pub fn root_xml(&self) -> &str {
        &self.root_xml
    }

    pub fn service_by_scpd_url(&self, url: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.scpd_url == url)
    }

    pub fn device_types(&self) -> Vec<String> {
        vec![self.device_type.to_string()]
    }

    pub fn service_types(&self) -> Vec<String> {
        self.services.iter().map(|s| s.service_type.clone()).collect()
    }
}

fn render_root(
    friendly_name: &str,
    device_type: &str,
    uuid: &str,
    services: &[ServiceDescriptor],
) -> String {
    let service_list: String = services
        .iter()
        .map(|s| {
            format!(
                r#"
   <service>
    <serviceType>{service_type}</serviceType>
    <serviceId>{service_id}</serviceId>
    <SCPDURL>{scpd_url}</SCPDURL>
    <controlURL>{control_url}</controlURL>
    <eventSubURL>{event_sub_url}</eventSubURL>
   </service>"#,
                service_type = escape(s.service_type.as_str()),
                service_id = escape(s.service_id.as_str()),
                scpd_url = s.scpd_url,
                control_url = s.control_url,
                event_sub_url = s.event_sub_url.as_deref().unwrap_or(""),
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0" xmlns:dlna="urn:schemas-dlna-org:device-1-0" xmlns:sec="http://www.sec.co.kr/dlna">
 <specVersion>
  <major>1</major>
  <minor>0</minor>
 </specVersion>
 <device>
  <deviceType>{device_type}</deviceType>
  <friendlyName>{name}</friendlyName>
  <manufacturer>{PRODUCT} project</manufacturer>
  <modelName>{PRODUCT} {VERSION}</modelName>
  <modelNumber>{VERSION}</modelNumber>
  <UDN>{uuid}</UDN>
  <dlna:X_DLNACAP/>
  <dlna:X_DLNADOC>DMS-1.50</dlna:X_DLNADOC>
  <dlna:X_DLNADOC>M-DMS-1.50</dlna:X_DLNADOC>
  <sec:ProductCap>smi,DCM10,getMediaInfo.sec,getCaptionInfo.sec</sec:ProductCap>
  <sec:X_ProductCap>smi,DCM10,getMediaInfo.sec,getCaptionInfo.sec</sec:X_ProductCap>
  <serviceList>{service_list}
  </serviceList>
  <presentationURL>/</presentationURL>
 </device>
</root>"#,
        device_type = escape(device_type),
        name = escape(friendly_name),
    )
}
