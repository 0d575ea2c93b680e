//! Core domain types
//!
//! All identifiers are opaque strings. The newtypes only exist so that a
//! vendor-id can't be passed where a thing-id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a raw identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Operator-chosen tenant key; selects an `apps` entry in the config
    /// file and partitions the state store
    AppName
);

string_id!(
    /// Cloud-assigned identifier of a gateway or end-node
    ThingId
);

string_id!(
    /// Vendor-assigned identifier of a device, stable across onboarding
    VendorThingId
);

string_id!(
    /// Cloud user identifier
    UserId
);

impl UserId {
    /// Owner string the cloud expects for this user (`user:<id>`)
    pub fn owner(&self) -> String {
        format!("user:{}", self.0)
    }
}

/// Cloud user that owns the gateway, as stored in the `users` namespace
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Cloud user id
    pub id: UserId,
    /// Access token obtained at login
    pub token: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("token", &redact(&self.token))
            .finish()
    }
}

/// One vendor-id to thing-id pair from a `nodes:<app>` namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMapping {
    /// Vendor-assigned identifier
    pub vendor_thing_id: VendorThingId,
    /// Cloud-assigned identifier
    pub thing_id: ThingId,
}

impl fmt::Display for NodeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "end-node {} -> {}", self.vendor_thing_id, self.thing_id)
    }
}

/// Parameters for onboarding an end-node under a gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndNodeOnboarding {
    /// Thing-id of the parent gateway
    pub gateway_thing_id: ThingId,
    /// Vendor-id of the end-node
    pub vendor_thing_id: VendorThingId,
    /// End-node password
    pub password: String,
    /// Owner string (`user:<id>`)
    pub owner: String,
    /// Optional thing type
    pub thing_type: Option<String>,
    /// Optional firmware version
    pub firmware_version: Option<String>,
}

/// Shorten a bearer token for log output
///
/// Keeps the first four characters so two tokens can still be told apart.
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    if prefix.len() == token.len() {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}
