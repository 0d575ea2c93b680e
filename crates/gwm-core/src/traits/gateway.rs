//! Local gateway agent

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{ThingId, VendorThingId};

/// Operations on the gateway agent's local REST API
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Obtain a bearer token with the agent's admin credentials
    async fn local_login(&self, username: &str, password: &str) -> Result<String, GatewayError>;

    /// Have the agent onboard the gateway itself; returns the gateway's
    /// thing-id
    async fn onboard_gateway(&self, token: &str) -> Result<ThingId, GatewayError>;

    /// Tell the agent which thing-id a vendor-identified end-node now has
    async fn map_end_node(
        &self,
        token: &str,
        vendor_thing_id: &VendorThingId,
        thing_id: &ThingId,
    ) -> Result<(), GatewayError>;

    /// Tell the agent that `thing_id` is now backed by different hardware
    async fn replace_end_node(
        &self,
        token: &str,
        thing_id: &ThingId,
        new_vendor_thing_id: &VendorThingId,
    ) -> Result<(), GatewayError>;

    /// End-nodes the agent has seen but that are not onboarded yet
    async fn list_pending_end_nodes(&self, token: &str)
        -> Result<Vec<serde_json::Value>, GatewayError>;

    /// Put the agent back into restore mode
    async fn restore(&self, token: &str) -> Result<(), GatewayError>;
}
