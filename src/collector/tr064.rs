//! TR-064 device access for FRITZ!Box routers.
//!
//! - [`Tr064Client`]: SOAP client implementing [`DeviceClient`](crate::collector::DeviceClient)
//! - [`Tr064Config`]: Address, credentials and timeouts

mod client;
pub mod description;
pub mod soap;

pub use client::{
    DEFAULT_ADDRESS, DEFAULT_HTTP_PORT, DEFAULT_TLS_PORT, DEFAULT_USERNAME, Tr064Client,
    Tr064Config,
};
