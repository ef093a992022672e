//! Clients - HTTP Clients
//!
//! Cliente HTTP del backend REST de portaria.

pub mod portaria_client;

pub use portaria_client::PortariaClient;
