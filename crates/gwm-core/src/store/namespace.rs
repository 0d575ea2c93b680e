//! Namespace addressing
//!
//! The persisted layout has three shared tables keyed by application name
//! (`tokens`, `gateway-ids`, `users`) and one `nodes:<app>` table per
//! application keyed by vendor-id. Physical table names are only ever built
//! here.

use std::fmt;
use std::str::FromStr;

use crate::types::AppName;

/// Kind of namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
    /// Local gateway agent bearer tokens, keyed by application
    Tokens,
    /// Gateway thing-ids, keyed by application
    GatewayIds,
    /// Cloud login users, keyed by application
    Users,
    /// Vendor-id to thing-id mappings of one application
    Nodes,
}

impl NamespaceKind {
    /// Kinds whose table is shared by every application
    pub const SHARED: [NamespaceKind; 3] = [
        NamespaceKind::Tokens,
        NamespaceKind::GatewayIds,
        NamespaceKind::Users,
    ];

    /// Name as used on the command line and in table names
    pub fn as_str(&self) -> &'static str {
        match self {
            NamespaceKind::Tokens => "tokens",
            NamespaceKind::GatewayIds => "gateway-ids",
            NamespaceKind::Users => "users",
            NamespaceKind::Nodes => "nodes",
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamespaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tokens" => Ok(NamespaceKind::Tokens),
            "gateway-ids" => Ok(NamespaceKind::GatewayIds),
            "users" => Ok(NamespaceKind::Users),
            "nodes" => Ok(NamespaceKind::Nodes),
            other => Err(format!(
                "unknown namespace '{}' (expected tokens, gateway-ids, users or nodes)",
                other
            )),
        }
    }
}

/// A namespace as seen by one application
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub kind: NamespaceKind,
    pub app: AppName,
}

impl Namespace {
    pub fn new(kind: NamespaceKind, app: AppName) -> Self {
        Self { kind, app }
    }

    /// Physical table holding this namespace
    pub fn table_name(&self) -> String {
        match self.kind {
            NamespaceKind::Nodes => format!("nodes:{}", self.app),
            kind => kind.as_str().to_string(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        let app = AppName::new("demo");
        assert_eq!(
            Namespace::new(NamespaceKind::Tokens, app.clone()).table_name(),
            "tokens"
        );
        assert_eq!(
            Namespace::new(NamespaceKind::GatewayIds, app.clone()).table_name(),
            "gateway-ids"
        );
        assert_eq!(
            Namespace::new(NamespaceKind::Users, app.clone()).table_name(),
            "users"
        );
        assert_eq!(
            Namespace::new(NamespaceKind::Nodes, app).table_name(),
            "nodes:demo"
        );
    }

    #[test]
    fn test_parse_kind() {
        for kind in [
            NamespaceKind::Tokens,
            NamespaceKind::GatewayIds,
            NamespaceKind::Users,
            NamespaceKind::Nodes,
        ] {
            assert_eq!(kind.as_str().parse::<NamespaceKind>().unwrap(), kind);
        }
        assert!("buckets".parse::<NamespaceKind>().is_err());
    }
}
