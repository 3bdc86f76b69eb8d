//! DLNA/UPnP MediaServer plumbing: SSDP discovery per interface, device and
//! service descriptions, and SOAP control routed to service handlers.

pub mod cli;
pub mod config;
pub mod http;
pub mod services;
pub mod ssdp;
pub mod upnp;
