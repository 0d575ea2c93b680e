//! Device-cloud REST client
//!
//! Every request carries the application's id and key headers. Calls made
//! on behalf of a user additionally send the user's access token as a
//! bearer token. Each call is a single attempt; failures are returned to
//! the caller as they happen.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use gwm_core::config::AppConfig;
use gwm_core::error::CloudError;
use gwm_core::traits::CloudApi;
use gwm_core::types::{EndNodeOnboarding, ThingId, User, UserId, VendorThingId};
use gwm_core::{CommandReceipt, CommandRequest};

const APP_ID_HEADER: &str = "X-Kii-AppID";
const APP_KEY_HEADER: &str = "X-Kii-AppKey";

const ONBOARD_BY_OWNER_TYPE: &str = "application/vnd.kii.OnboardingWithThingIDByOwner+json";
const ONBOARD_END_NODE_TYPE: &str =
    "application/vnd.kii.OnboardingEndNodeWithGatewayThingID+json";
const VENDOR_THING_ID_UPDATE_TYPE: &str = "application/vnd.kii.VendorThingIDUpdateRequest+json";

/// Client for one application on the device cloud
#[derive(Debug, Clone)]
pub struct CloudClient {
    app_id: String,
    app_key: String,
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterUserRequest<'a> {
    login_name: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    grant_type: &'static str,
}

#[derive(Deserialize)]
struct LoginResponse {
    id: String,
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OnboardByOwnerRequest<'a> {
    #[serde(rename = "thingID")]
    thing_id: &'a str,
    thing_password: &'a str,
    owner: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OnboardEndNodeRequest<'a> {
    #[serde(rename = "gatewayThingID")]
    gateway_thing_id: &'a str,
    #[serde(rename = "endNodeVendorThingID")]
    end_node_vendor_thing_id: &'a str,
    end_node_password: &'a str,
    owner: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_node_thing_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_node_firmware_version: Option<&'a str>,
}

#[derive(Deserialize)]
struct OnboardEndNodeResponse {
    #[serde(rename = "endNodeThingID")]
    end_node_thing_id: String,
}

#[derive(Serialize)]
struct VendorThingIdUpdateRequest<'a> {
    #[serde(rename = "_vendorThingID")]
    vendor_thing_id: &'a str,
    #[serde(rename = "_password")]
    password: &'a str,
}

impl CloudClient {
    /// Create a client for `app`, resolving the base URL from its site or
    /// host override
    pub fn new(app: &AppConfig) -> Self {
        Self::with_base_url(app, app.cloud_base_url())
    }

    /// Create a client for `app` against an explicit base URL
    pub fn with_base_url(app: &AppConfig, base_url: impl Into<String>) -> Self {
        Self {
            app_id: app.id.clone(),
            app_key: app.key.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn users_path(app_id: &str) -> String {
        format!("/api/apps/{}/users", app_id)
    }

    pub fn login_path(app_id: &str) -> String {
        format!("/api/apps/{}/oauth2/token", app_id)
    }

    pub fn onboardings_path(app_id: &str) -> String {
        format!("/thing-if/apps/{}/onboardings", app_id)
    }

    pub fn vendor_thing_id_path(app_id: &str, thing_id: &ThingId) -> String {
        format!("/api/apps/{}/things/{}/vendor-thing-id", app_id, thing_id)
    }

    pub fn commands_path(app_id: &str, thing_id: &ThingId) -> String {
        format!("/thing-if/apps/{}/targets/thing:{}/commands", app_id, thing_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_app_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(APP_ID_HEADER, &self.app_id)
            .header(APP_KEY_HEADER, &self.app_key)
    }

    fn vendor_json<T: Serialize>(
        request: RequestBuilder,
        content_type: &'static str,
        body: &T,
    ) -> Result<RequestBuilder, CloudError> {
        let bytes = serde_json::to_vec(body).map_err(|e| CloudError::Decode(e.to_string()))?;
        Ok(request.header(CONTENT_TYPE, content_type).body(bytes))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CloudError> {
        let response = self
            .with_app_headers(request)
            .send()
            .await
            .map_err(|e| CloudError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "Cloud request rejected");
            return Err(CloudError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CloudError> {
        let response = self.send(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CloudError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| CloudError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CloudApi for CloudClient {
    async fn register_user(&self, username: &str, password: &str) -> Result<(), CloudError> {
        let url = self.url(&Self::users_path(&self.app_id));
        tracing::debug!("POST {}", url);
        let body = RegisterUserRequest {
            login_name: username,
            password,
        };
        self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    async fn login_user(&self, username: &str, password: &str) -> Result<User, CloudError> {
        let url = self.url(&Self::login_path(&self.app_id));
        tracing::debug!("POST {}", url);
        let body = LoginRequest {
            username,
            password,
            grant_type: "password",
        };
        let response: LoginResponse = self
            .send_json(self.http.post(url).json(&body))
            .await
            .map_err(|e| match e {
                CloudError::Http {
                    status: 400 | 401 | 403,
                    body,
                } => CloudError::Authentication(body),
                other => other,
            })?;

        if response.id.is_empty() || response.access_token.is_empty() {
            return Err(CloudError::Decode(
                "login response without id or access_token".to_string(),
            ));
        }

        Ok(User {
            id: UserId::new(response.id),
            token: response.access_token,
        })
    }

    async fn onboard_end_node(
        &self,
        user: &User,
        request: &EndNodeOnboarding,
    ) -> Result<ThingId, CloudError> {
        let url = self.url(&Self::onboardings_path(&self.app_id));
        tracing::debug!("POST {} (end-node {})", url, request.vendor_thing_id);
        let body = OnboardEndNodeRequest {
            gateway_thing_id: request.gateway_thing_id.as_str(),
            end_node_vendor_thing_id: request.vendor_thing_id.as_str(),
            end_node_password: &request.password,
            owner: &request.owner,
            end_node_thing_type: request.thing_type.as_deref(),
            end_node_firmware_version: request.firmware_version.as_deref(),
        };
        let builder = Self::vendor_json(
            self.http.post(url).bearer_auth(&user.token),
            ONBOARD_END_NODE_TYPE,
            &body,
        )?;
        let response: OnboardEndNodeResponse = self.send_json(builder).await?;
        if response.end_node_thing_id.is_empty() {
            return Err(CloudError::Decode("empty endNodeThingID".to_string()));
        }
        Ok(ThingId::new(response.end_node_thing_id))
    }

    async fn assign_owner(
        &self,
        user: &User,
        thing_id: &ThingId,
        thing_password: &str,
    ) -> Result<(), CloudError> {
        let url = self.url(&Self::onboardings_path(&self.app_id));
        tracing::debug!("POST {} (owner of {})", url, thing_id);
        let body = OnboardByOwnerRequest {
            thing_id: thing_id.as_str(),
            thing_password,
            owner: user.id.owner(),
        };
        let builder = Self::vendor_json(
            self.http.post(url).bearer_auth(&user.token),
            ONBOARD_BY_OWNER_TYPE,
            &body,
        )?;
        self.send(builder).await?;
        Ok(())
    }

    async fn update_vendor_thing_id(
        &self,
        user: &User,
        thing_id: &ThingId,
        new_vendor_thing_id: &VendorThingId,
        password: &str,
    ) -> Result<(), CloudError> {
        let url = self.url(&Self::vendor_thing_id_path(&self.app_id, thing_id));
        tracing::debug!("PUT {}", url);
        let body = VendorThingIdUpdateRequest {
            vendor_thing_id: new_vendor_thing_id.as_str(),
            password,
        };
        let builder = Self::vendor_json(
            self.http.put(url).bearer_auth(&user.token),
            VENDOR_THING_ID_UPDATE_TYPE,
            &body,
        )?;
        self.send(builder).await?;
        Ok(())
    }

    async fn post_command(
        &self,
        user: &User,
        thing_id: &ThingId,
        command: &CommandRequest,
    ) -> Result<CommandReceipt, CloudError> {
        let url = self.url(&Self::commands_path(&self.app_id, thing_id));
        tracing::debug!("POST {}", url);
        self.send_json(self.http.post(url).bearer_auth(&user.token).json(command))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> AppConfig {
        AppConfig {
            id: "app-id".into(),
            key: "app-key".into(),
            site: "jp".into(),
            host: None,
        }
    }

    #[test]
    fn test_base_url_from_site() {
        assert_eq!(CloudClient::new(&app()).base_url(), "https://api-jp.kii.com");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = CloudClient::with_base_url(&app(), "http://127.0.0.1:9000/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_paths() {
        let thing = ThingId::new("th.1234");
        assert_eq!(CloudClient::users_path("a1"), "/api/apps/a1/users");
        assert_eq!(CloudClient::login_path("a1"), "/api/apps/a1/oauth2/token");
        assert_eq!(
            CloudClient::onboardings_path("a1"),
            "/thing-if/apps/a1/onboardings"
        );
        assert_eq!(
            CloudClient::vendor_thing_id_path("a1", &thing),
            "/api/apps/a1/things/th.1234/vendor-thing-id"
        );
        assert_eq!(
            CloudClient::commands_path("a1", &thing),
            "/thing-if/apps/a1/targets/thing:th.1234/commands"
        );
    }

    #[test]
    fn test_end_node_request_omits_absent_options() {
        let body = OnboardEndNodeRequest {
            gateway_thing_id: "gw-42",
            end_node_vendor_thing_id: "v-100",
            end_node_password: "np",
            owner: "user:u1",
            end_node_thing_type: None,
            end_node_firmware_version: Some("1.0"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["gatewayThingID"], "gw-42");
        assert_eq!(json["endNodeVendorThingID"], "v-100");
        assert_eq!(json["endNodePassword"], "np");
        assert_eq!(json["owner"], "user:u1");
        assert_eq!(json["endNodeFirmwareVersion"], "1.0");
        assert!(json.get("endNodeThingType").is_none());
    }
}
