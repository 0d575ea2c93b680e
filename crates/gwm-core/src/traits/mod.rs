//! Collaborator traits
//!
//! The orchestrator talks to the cloud service and the gateway agent only
//! through these traits.

mod cloud;
mod gateway;

pub use cloud::CloudApi;
pub use gateway::GatewayApi;
