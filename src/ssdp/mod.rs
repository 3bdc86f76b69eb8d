//! SSDP discovery: one engine per network interface.

pub mod engine;
pub mod messages;
pub mod request;
pub mod service;
pub mod socket;

pub use engine::SsdpEngine;
pub use messages::Advertisement;
