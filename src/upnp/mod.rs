//! UPnP device model: service URNs, SOAP action identifiers, the error model
//! and the device/service descriptions served over HTTP.

pub mod description;
pub mod error;
pub mod scpd;
pub mod urn;

pub use description::{DeviceDescription, ServiceDescriptor};
pub use error::{HandlerError, UpnpError};
pub use urn::{ParseError, ServiceUrn, SoapAction};
