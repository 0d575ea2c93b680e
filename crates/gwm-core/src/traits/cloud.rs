//! Cloud device-management service

use async_trait::async_trait;

use crate::command::{CommandReceipt, CommandRequest};
use crate::error::CloudError;
use crate::types::{EndNodeOnboarding, ThingId, User, VendorThingId};

/// Operations on the remote device-management service, scoped to one
/// application
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Register a new cloud user
    async fn register_user(&self, username: &str, password: &str) -> Result<(), CloudError>;

    /// Log in as an existing cloud user
    async fn login_user(&self, username: &str, password: &str) -> Result<User, CloudError>;

    /// Register `username` if needed, then log in
    ///
    /// A failed registration (typically: the user already exists) does not
    /// stop the login; it is logged as a warning. Any login failure is
    /// reported as [`CloudError::Authentication`].
    async fn register_and_login(&self, username: &str, password: &str) -> Result<User, CloudError> {
        if let Err(e) = self.register_user(username, password).await {
            tracing::warn!(username, "User registration failed, trying login: {}", e);
        }

        self.login_user(username, password)
            .await
            .map_err(|e| match e {
                CloudError::Authentication(msg) => CloudError::Authentication(msg),
                other => CloudError::Authentication(other.to_string()),
            })
    }

    /// Onboard an end-node under an existing gateway thing
    async fn onboard_end_node(
        &self,
        user: &User,
        request: &EndNodeOnboarding,
    ) -> Result<ThingId, CloudError>;

    /// Claim ownership of `thing_id` for `user`
    async fn assign_owner(
        &self,
        user: &User,
        thing_id: &ThingId,
        thing_password: &str,
    ) -> Result<(), CloudError>;

    /// Change the vendor-id of an existing thing, keeping its thing-id
    async fn update_vendor_thing_id(
        &self,
        user: &User,
        thing_id: &ThingId,
        new_vendor_thing_id: &VendorThingId,
        password: &str,
    ) -> Result<(), CloudError>;

    /// Submit a command to `thing_id`
    ///
    /// The request's issuer must already be set; see
    /// [`CommandRequest::from_document`].
    async fn post_command(
        &self,
        user: &User,
        thing_id: &ThingId,
        command: &CommandRequest,
    ) -> Result<CommandReceipt, CloudError>;
}
