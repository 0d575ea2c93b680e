//! Provisioning transitions
//!
//! Each public method is one operator command. A transition reads the
//! state it needs from the store, makes its remote calls in order, and only
//! records state that a remote call has already confirmed. Nothing is
//! retried and no remote side effect is rolled back automatically.

use serde_json::Value;

use gwm_core::error::{ConfigError, PreconditionError};
use gwm_core::store::StateReader;
use gwm_core::traits::{CloudApi, GatewayApi};
use gwm_core::types::{redact, EndNodeOnboarding};
use gwm_core::{
    AppName, CommandReceipt, CommandRequest, GwmError, NodeMapping, StateStore, ThingId, User,
    VendorThingId,
};

/// End-node details supplied by the operator for `onboard-node`
///
/// An empty thing type or firmware version counts as not given.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistration {
    pub vendor_thing_id: String,
    pub password: String,
    pub thing_type: Option<String>,
    pub firmware_version: Option<String>,
}

/// Provisioning workflow for one application
///
/// Owns everything a transition needs: the application name that selects
/// the persisted record, the store handle, and the two collaborators.
pub struct Provisioner<C, G> {
    app: AppName,
    store: StateStore,
    cloud: C,
    gateway: G,
}

impl<C, G> Provisioner<C, G>
where
    C: CloudApi,
    G: GatewayApi,
{
    pub fn new(app: AppName, store: StateStore, cloud: C, gateway: G) -> Self {
        Self {
            app,
            store,
            cloud,
            gateway,
        }
    }

    /// Application this provisioner acts for
    pub fn app(&self) -> &AppName {
        &self.app
    }

    /// Underlying state store
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Register (if needed) and log in the cloud user that will own the
    /// gateway; records `users[app]`
    pub async fn login(&self, username: &str, password: &str) -> Result<User, GwmError> {
        require("username", username)?;
        require("password", password)?;

        let user = self.cloud.register_and_login(username, password).await?;
        self.store.update(|w| w.put_user(&self.app, &user))?;

        tracing::info!(app = %self.app, user_id = %user.id, "Stored login user");
        Ok(user)
    }

    /// Log in to the gateway agent; records `tokens[app]`
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), GwmError> {
        require("username", username)?;
        require("password", password)?;

        let token = self.gateway.local_login(username, password).await?;
        self.store.update(|w| w.put_token(&self.app, &token))?;

        tracing::info!(app = %self.app, token = %redact(&token), "Stored gateway agent token");
        Ok(())
    }

    /// Have the gateway agent onboard the gateway; records
    /// `gateway-ids[app]`
    pub async fn onboard_gateway(&self) -> Result<ThingId, GwmError> {
        let token = self.store.view(|r| self.require_token(r))?;

        let thing_id = self.gateway.onboard_gateway(&token).await?;
        self.store.update(|w| w.put_gateway_id(&self.app, &thing_id))?;

        tracing::info!(app = %self.app, thing_id = %thing_id, "Stored gateway id");
        Ok(thing_id)
    }

    /// Make the stored login user the owner of the onboarded gateway
    pub async fn add_owner(&self, gateway_password: &str) -> Result<(), GwmError> {
        require("gateway-password", gateway_password)?;
        let (gateway_id, user) = self
            .store
            .view(|r| Ok::<_, GwmError>((self.require_gateway_id(r)?, self.require_user(r)?)))?;

        tracing::debug!(gateway_id = %gateway_id, user = ?user, "Assigning gateway owner");
        self.cloud
            .assign_owner(&user, &gateway_id, gateway_password)
            .await?;

        tracing::info!(app = %self.app, gateway_id = %gateway_id, owner = %user.id.owner(), "Gateway owner assigned");
        Ok(())
    }

    /// Onboard an end-node under the gateway and tell the agent about it;
    /// records `nodes:<app>[vendor-id]`
    ///
    /// The mapping is recorded as soon as the cloud has onboarded the node.
    /// If the agent then refuses the mapping, the error is returned as
    /// [`GwmError::PartiallyApplied`] and the stored mapping stays, so the
    /// operator only has to repeat the agent side.
    pub async fn onboard_node(&self, node: NodeRegistration) -> Result<NodeMapping, GwmError> {
        require("node-vid", &node.vendor_thing_id)?;
        require("node-password", &node.password)?;
        let (gateway_id, user, token) = self.store.view(|r| {
            Ok::<_, GwmError>((
                self.require_gateway_id(r)?,
                self.require_user(r)?,
                self.require_token(r)?,
            ))
        })?;

        let vendor_thing_id = VendorThingId::new(node.vendor_thing_id);
        let request = EndNodeOnboarding {
            gateway_thing_id: gateway_id,
            vendor_thing_id: vendor_thing_id.clone(),
            password: node.password,
            owner: user.id.owner(),
            thing_type: node.thing_type.filter(|s| !s.is_empty()),
            firmware_version: node.firmware_version.filter(|s| !s.is_empty()),
        };
        let thing_id = self.cloud.onboard_end_node(&user, &request).await?;

        let mapping = NodeMapping {
            vendor_thing_id,
            thing_id,
        };
        if let Err(e) = self
            .store
            .update(|w| w.put_node(&self.app, &mapping.vendor_thing_id, &mapping.thing_id))
        {
            tracing::error!(app = %self.app, "Cloud onboarded {} but it could not be stored", mapping);
            return Err(e.into());
        }
        tracing::info!(app = %self.app, "Stored {}", mapping);

        self.gateway
            .map_end_node(&token, &mapping.vendor_thing_id, &mapping.thing_id)
            .await
            .map_err(|e| GwmError::partially_applied(mapping.to_string(), e))?;

        Ok(mapping)
    }

    /// Send a command document to an onboarded end-node
    ///
    /// The document's issuer is replaced by the stored login user.
    pub async fn post_command(
        &self,
        vendor_thing_id: &str,
        document: &[u8],
    ) -> Result<CommandReceipt, GwmError> {
        require("node-vid", vendor_thing_id)?;
        let vendor_thing_id = VendorThingId::new(vendor_thing_id);
        let (user, thing_id) = self.store.view(|r| {
            Ok::<_, GwmError>((self.require_user(r)?, self.require_node(r, &vendor_thing_id)?))
        })?;

        let command = CommandRequest::from_document(document, &user.id)?;
        let receipt = self.cloud.post_command(&user, &thing_id, &command).await?;

        tracing::info!(app = %self.app, thing_id = %thing_id, command_id = %receipt.command_id, "Command posted");
        Ok(receipt)
    }

    /// Move an end-node's thing-id to new hardware
    ///
    /// Updates the vendor-id in the cloud, then on the agent, then swaps the
    /// mapping in one store transaction. If either remote call fails the
    /// stored mapping is left exactly as it was.
    pub async fn replace_node(
        &self,
        old_vendor_thing_id: &str,
        new_vendor_thing_id: &str,
        password: &str,
    ) -> Result<NodeMapping, GwmError> {
        require("node-vid", old_vendor_thing_id)?;
        require("new-vid", new_vendor_thing_id)?;
        require("node-password", password)?;
        let old_vid = VendorThingId::new(old_vendor_thing_id);
        let new_vid = VendorThingId::new(new_vendor_thing_id);

        let (user, thing_id, token) = self.store.view(|r| {
            Ok::<_, GwmError>((
                self.require_user(r)?,
                self.require_node(r, &old_vid)?,
                self.require_token(r)?,
            ))
        })?;

        self.cloud
            .update_vendor_thing_id(&user, &thing_id, &new_vid, password)
            .await?;

        self.gateway
            .replace_end_node(&token, &thing_id, &new_vid)
            .await
            .map_err(|e| {
                GwmError::partially_applied(
                    format!("cloud vendor-id of {} changed to {}", thing_id, new_vid),
                    e,
                )
            })?;

        let mapping = NodeMapping {
            vendor_thing_id: new_vid,
            thing_id,
        };
        self.store.update(|w| {
            w.remove_node(&self.app, &old_vid)?;
            w.put_node(&self.app, &mapping.vendor_thing_id, &mapping.thing_id)
        })?;

        tracing::info!(app = %self.app, old = %old_vid, "Replaced with {}", mapping);
        Ok(mapping)
    }

    /// Put the gateway agent into restore mode
    pub async fn restore(&self) -> Result<(), GwmError> {
        let token = self.store.view(|r| self.require_token(r))?;
        self.gateway.restore(&token).await?;
        tracing::info!(app = %self.app, "Gateway restore requested");
        Ok(())
    }

    /// End-nodes the gateway agent knows about but that are not onboarded
    pub async fn list_pending_nodes(&self) -> Result<Vec<Value>, GwmError> {
        let token = self.store.view(|r| self.require_token(r))?;
        let nodes = self.gateway.list_pending_end_nodes(&token).await?;
        tracing::debug!(app = %self.app, count = nodes.len(), "Listed pending end-nodes");
        Ok(nodes)
    }

    fn require_token(&self, r: &StateReader) -> Result<String, GwmError> {
        r.token(&self.app)?.ok_or_else(|| {
            PreconditionError::MissingToken {
                app: self.app.to_string(),
            }
            .into()
        })
    }

    fn require_gateway_id(&self, r: &StateReader) -> Result<ThingId, GwmError> {
        r.gateway_id(&self.app)?.ok_or_else(|| {
            PreconditionError::MissingGatewayId {
                app: self.app.to_string(),
            }
            .into()
        })
    }

    fn require_user(&self, r: &StateReader) -> Result<User, GwmError> {
        r.user(&self.app)?.ok_or_else(|| {
            PreconditionError::MissingUser {
                app: self.app.to_string(),
            }
            .into()
        })
    }

    fn require_node(
        &self,
        r: &StateReader,
        vendor_thing_id: &VendorThingId,
    ) -> Result<ThingId, GwmError> {
        r.node_thing_id(&self.app, vendor_thing_id)?.ok_or_else(|| {
            PreconditionError::UnknownNode {
                app: self.app.to_string(),
                vendor_thing_id: vendor_thing_id.to_string(),
            }
            .into()
        })
    }
}

fn require(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingArgument(name));
    }
    Ok(())
}
