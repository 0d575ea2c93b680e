//! gwm-client: HTTP collaborators for gw-manager
//!
//! [`CloudClient`] talks to the device-management cloud and
//! [`GatewayClient`] to the gateway agent's local REST API. Both implement
//! the collaborator traits from `gwm-core`, so the orchestrator never sees
//! HTTP details.

pub mod cloud;
pub mod gateway;

pub use cloud::CloudClient;
pub use gateway::GatewayClient;
