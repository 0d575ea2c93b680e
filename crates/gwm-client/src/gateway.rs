//! Gateway agent REST client
//!
//! The agent listens on plain HTTP on the gateway's local network. The
//! token endpoint is protected with basic auth built from the application
//! id and key; everything else takes the bearer token it hands out.
//! Any status outside 200..=399 is a failure.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

use gwm_core::config::{AppConfig, GatewayAddress};
use gwm_core::error::GatewayError;
use gwm_core::traits::GatewayApi;
use gwm_core::types::{redact, ThingId, VendorThingId};

/// Client for the gateway agent of one application
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    site: String,
    app_id: String,
    app_key: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct MapEndNodeRequest<'a> {
    #[serde(rename = "thingID")]
    thing_id: &'a str,
}

#[derive(Serialize)]
struct ReplaceEndNodeRequest<'a> {
    #[serde(rename = "vendorThingID")]
    vendor_thing_id: &'a str,
}

impl GatewayClient {
    /// Create a client for the agent at `address`, acting for `app`
    pub fn new(address: &GatewayAddress, app: &AppConfig) -> Self {
        Self::with_base_url(address.base_url(), app)
    }

    /// Create a client against an explicit base URL
    pub fn with_base_url(base_url: impl Into<String>, app: &AppConfig) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            site: app.site.clone(),
            app_id: app.id.clone(),
            app_key: app.key.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_path(site: &str) -> String {
        format!("/{}/token", site)
    }

    pub fn onboarding_path(site: &str, app_id: &str) -> String {
        format!("/{}/apps/{}/gateway/onboarding", site, app_id)
    }

    pub fn map_end_node_path(site: &str, app_id: &str, vendor_thing_id: &VendorThingId) -> String {
        format!(
            "/{}/apps/{}/gateway/end-nodes/VENDOR_THING_ID:{}",
            site, app_id, vendor_thing_id
        )
    }

    pub fn end_node_path(site: &str, app_id: &str, thing_id: &ThingId) -> String {
        format!("/{}/apps/{}/gateway/end-nodes/{}", site, app_id, thing_id)
    }

    pub fn pending_end_nodes_path(site: &str, app_id: &str) -> String {
        format!("/{}/apps/{}/gateway/end-nodes/pending", site, app_id)
    }

    pub fn restore_path() -> &'static str {
        "/gateway-app/gateway/restore"
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..400).contains(&status) {
            tracing::debug!(operation, status, "Gateway agent request rejected");
            return Err(GatewayError::Http { operation, status });
        }
        Ok(response)
    }

    async fn send_json(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Value, GatewayError> {
        let response = self.send(operation, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

fn string_field(body: &Value, field: &str) -> Result<String, GatewayError> {
    match body.get(field).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(GatewayError::Decode(format!(
            "response has no '{}' string",
            field
        ))),
    }
}

#[async_trait]
impl GatewayApi for GatewayClient {
    async fn local_login(&self, username: &str, password: &str) -> Result<String, GatewayError> {
        if username.is_empty() || password.is_empty() {
            return Err(GatewayError::EmptyCredentials);
        }

        let url = self.url(&Self::token_path(&self.site));
        tracing::debug!("POST {}", url);
        let request = self
            .http
            .post(url)
            .basic_auth(&self.app_id, Some(&self.app_key))
            .json(&TokenRequest { username, password });

        let body = self.send_json("authenticate", request).await?;
        let token = string_field(&body, "accessToken")?;
        tracing::debug!(token = %redact(&token), "Gateway agent issued token");
        Ok(token)
    }

    async fn onboard_gateway(&self, token: &str) -> Result<ThingId, GatewayError> {
        let url = self.url(&Self::onboarding_path(&self.site, &self.app_id));
        tracing::debug!("POST {}", url);
        let body = self
            .send_json("onboard gateway", self.http.post(url).bearer_auth(token))
            .await?;
        tracing::debug!("Onboarding response: {}", body);
        Ok(ThingId::new(string_field(&body, "thingID")?))
    }

    async fn map_end_node(
        &self,
        token: &str,
        vendor_thing_id: &VendorThingId,
        thing_id: &ThingId,
    ) -> Result<(), GatewayError> {
        let url = self.url(&Self::map_end_node_path(
            &self.site,
            &self.app_id,
            vendor_thing_id,
        ));
        tracing::debug!("PUT {}", url);
        let request = self.http.put(url).bearer_auth(token).json(&MapEndNodeRequest {
            thing_id: thing_id.as_str(),
        });
        self.send("map end-node", request).await?;
        Ok(())
    }

    async fn replace_end_node(
        &self,
        token: &str,
        thing_id: &ThingId,
        new_vendor_thing_id: &VendorThingId,
    ) -> Result<(), GatewayError> {
        let url = self.url(&Self::end_node_path(&self.site, &self.app_id, thing_id));
        tracing::debug!("PUT {}", url);
        let request = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(&ReplaceEndNodeRequest {
                vendor_thing_id: new_vendor_thing_id.as_str(),
            });
        self.send("replace end-node", request).await?;
        Ok(())
    }

    async fn list_pending_end_nodes(&self, token: &str) -> Result<Vec<Value>, GatewayError> {
        let url = self.url(&Self::pending_end_nodes_path(&self.site, &self.app_id));
        tracing::debug!("GET {}", url);
        let body = self
            .send_json("list pending end-nodes", self.http.get(url).bearer_auth(token))
            .await?;
        match body {
            Value::Array(nodes) => Ok(nodes),
            other => Err(GatewayError::Decode(format!(
                "expected an array of pending end-nodes, got {}",
                other
            ))),
        }
    }

    async fn restore(&self, token: &str) -> Result<(), GatewayError> {
        let url = self.url(Self::restore_path());
        tracing::debug!("POST {}", url);
        self.send("restore", self.http.post(url).bearer_auth(token))
            .await?;
        Ok(())
    }
}
