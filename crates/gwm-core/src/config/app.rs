//! Application and gateway address configuration

use serde::{Deserialize, Serialize};

/// One application registered with the cloud service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application identifier
    #[serde(rename = "app-id")]
    pub id: String,

    /// Application secret key
    #[serde(rename = "app-key")]
    pub key: String,

    /// Site code (`us`, `jp`, `cn`, `sg`, `eu`)
    #[serde(rename = "app-site")]
    pub site: String,

    /// Host override; takes precedence over the site when non-empty
    #[serde(rename = "app-host", default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl AppConfig {
    /// The location used to reach the cloud: the host override if set,
    /// otherwise the site
    pub fn location(&self) -> &str {
        match self.host.as_deref() {
            Some(host) if !host.is_empty() => host,
            _ => &self.site,
        }
    }

    /// Base URL of the cloud service, without a trailing slash
    ///
    /// Known site codes map to their regional hosts. Any other location is
    /// taken as a host name, or used verbatim if it already has a scheme.
    pub fn cloud_base_url(&self) -> String {
        let location = self.location().trim();
        let host = match location.to_ascii_lowercase().as_str() {
            "us" => "api.kii.com",
            "jp" => "api-jp.kii.com",
            "cn" => "api-cn3.kii.com",
            "sg" => "api-sg.kii.com",
            "eu" => "api-eu.kii.com",
            _ => location,
        };

        if host.contains("://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        }
    }
}

/// Address of the local gateway agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayAddress {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayAddress {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 4001,
        }
    }
}

impl GatewayAddress {
    /// Base URL of the agent's REST API
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(site: &str, host: Option<&str>) -> AppConfig {
        AppConfig {
            id: "id".into(),
            key: "key".into(),
            site: site.into(),
            host: host.map(str::to_string),
        }
    }

    #[test]
    fn test_location_prefers_host() {
        assert_eq!(app("jp", None).location(), "jp");
        assert_eq!(app("jp", Some("")).location(), "jp");
        assert_eq!(app("jp", Some("api.example.com")).location(), "api.example.com");
    }

    #[test]
    fn test_cloud_base_url_sites() {
        assert_eq!(app("us", None).cloud_base_url(), "https://api.kii.com");
        assert_eq!(app("JP", None).cloud_base_url(), "https://api-jp.kii.com");
        assert_eq!(app("cn", None).cloud_base_url(), "https://api-cn3.kii.com");
        assert_eq!(app("sg", None).cloud_base_url(), "https://api-sg.kii.com");
        assert_eq!(app("eu", None).cloud_base_url(), "https://api-eu.kii.com");
    }

    #[test]
    fn test_cloud_base_url_custom_host() {
        assert_eq!(
            app("us", Some("cloud.example.com")).cloud_base_url(),
            "https://cloud.example.com"
        );
        assert_eq!(
            app("us", Some("http://127.0.0.1:8080/")).cloud_base_url(),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_gateway_base_url() {
        let addr = GatewayAddress {
            host: "10.0.0.2".into(),
            port: 4001,
        };
        assert_eq!(addr.base_url(), "http://10.0.0.2:4001");
    }
}
