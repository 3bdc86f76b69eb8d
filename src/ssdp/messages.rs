use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::upnp::description::{DeviceDescription, ROOT_DESC_PATH};

pub const SSDP_ADDR: &str = "239.255.255.250:1900";
pub const ROOT_DEVICE: &str = "upnp:rootdevice";
pub const SSDP_ALL: &str = "ssdp:all";
pub const SSDP_DISCOVER: &str = "\"ssdp:discover\"";

/// Longest notify interval an engine will run with.
pub const MAX_NOTIFY_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// One identifier a device advertises and answers searches for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotifyTarget {
    RootDevice,
    Uuid(String),
    DeviceType(String),
    ServiceType(String),
}

impl NotifyTarget {
    pub fn as_str(&self) -> &str {
        match self {
            NotifyTarget::RootDevice => ROOT_DEVICE,
            NotifyTarget::Uuid(s) | NotifyTarget::DeviceType(s) | NotifyTarget::ServiceType(s) => s.as_str(),
        }
    }
}

impl fmt::Display for NotifyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root marker, UUID, then every device type and every service type.
pub fn notify_targets(
    uuid: &str,
    device_types: &[String],
    service_types: &[String],
) -> Vec<NotifyTarget> {
    let mut targets = vec![NotifyTarget::RootDevice, NotifyTarget::Uuid(uuid.to_string())];
    targets.extend(device_types.iter().cloned().map(NotifyTarget::DeviceType));
    targets.extend(service_types.iter().cloned().map(NotifyTarget::ServiceType));
    targets
}

/// Everything an SSDP engine needs to describe the device on the wire.
/// Shared by all engines; never mutated after construction.
#[derive(Debug, Clone)]
pub struct Advertisement {
    pub uuid: String,
    pub server: String,
    pub targets: Vec<NotifyTarget>,
    pub http_port: u16,
    pub notify_interval: Duration,
}

impl Advertisement {
    pub fn new(device: &DeviceDescription, http_port: u16, notify_interval: Duration) -> Self {
        Advertisement {
            uuid: device.uuid.clone(),
            server: device.server.clone(),
            targets: notify_targets(&device.uuid, &device.device_types(), &device.service_types()),
            http_port,
            notify_interval,
        }
    }

    pub fn usn(&self, target: &NotifyTarget) -> String {
        if target.as_str() == self.uuid {
            self.uuid.clone()
        } else {
            format!("{}::{}", self.uuid, target)
        }
    }

    /// Advertised lifetime: two and a half notify intervals.
    pub fn max_age(&self) -> u64 {
        self.notify_interval.as_secs().saturating_mul(5) / 2
    }

    pub fn location(&self, ip: Ipv4Addr) -> String {
        format!("http://{}:{}{}", ip, self.http_port, ROOT_DESC_PATH)
    }

    /// Targets matching an M-SEARCH `ST` value. Anything other than
    /// `ssdp:all` must match exactly.
    pub fn resolve(&self, st: &str) -> Vec<&NotifyTarget> {
        if st == SSDP_ALL {
            return self.targets.iter().collect();
        }
        self.targets.iter().filter(|t| t.as_str() == st).take(1).collect()
    }

    /// NOTIFY ssdp:alive. CRLF line endings are mandatory; strict clients
    /// silently ignore bare `\n`.
    pub fn notify_alive(&self, target: &NotifyTarget, location: &str) -> String {
        format!(
            "NOTIFY * HTTP/1.1\r\n\
HOST: {SSDP_ADDR}\r\n\
NT: {target}\r\n\
NTS: ssdp:alive\r\n\
SERVER: {server}\r\n\
USN: {usn}\r\n\
CACHE-CONTROL: max-age={max_age}\r\n\
LOCATION: {location}\r\n\
\r\n",
            server = self.server,
            usn = self.usn(target),
            max_age = self.max_age(),
        )
    }

    pub fn notify_byebye(&self, target: &NotifyTarget) -> String {
        format!(
            "NOTIFY * HTTP/1.1\r\n\
HOST: {SSDP_ADDR}\r\n\
NT: {target}\r\n\
NTS: ssdp:byebye\r\n\
SERVER: {server}\r\n\
USN: {usn}\r\n\
\r\n",
            server = self.server,
            usn = self.usn(target),
        )
    }

    /// Unicast 200 OK answering an M-SEARCH; `ST` echoes the matched target.
    pub fn search_response(&self, target: &NotifyTarget, location: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\n\
CACHE-CONTROL: max-age={max_age}\r\n\
EXT:\r\n\
LOCATION: {location}\r\n\
SERVER: {server}\r\n\
ST: {target}\r\n\
USN: {usn}\r\n\
Content-Length: 0\r\n\
\r\n",
            max_age = self.max_age(),
            server = self.server,
            usn = self.usn(target),
        )
    }
}
