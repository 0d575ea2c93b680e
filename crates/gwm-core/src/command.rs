//! Command documents delivered to end-nodes
//!
//! Operators describe a command in a JSON file. The `issuer` declared in the
//! file is never trusted: [`CommandRequest::from_document`] always replaces
//! it with the stored login user, so a crafted file can't issue commands in
//! someone else's name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CloudError;
use crate::types::UserId;

/// Command submission body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Actions to execute, in order
    pub actions: Vec<Value>,

    /// Issuer (`user:<id>`)
    #[serde(default)]
    pub issuer: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    /// Fields this tool doesn't interpret, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CommandRequest {
    /// Parse a command document and set its issuer to `issuer`
    pub fn from_document(document: &[u8], issuer: &UserId) -> Result<Self, CloudError> {
        let mut request: CommandRequest = serde_json::from_slice(document)
            .map_err(|e| CloudError::InvalidCommand(e.to_string()))?;
        request.issuer = issuer.owner();
        Ok(request)
    }
}

/// Cloud acknowledgement of a submitted command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReceipt {
    /// Identifier assigned to the command
    #[serde(rename = "commandID")]
    pub command_id: String,
}
