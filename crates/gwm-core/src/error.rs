//! Core error types for gw-manager
//!
//! Errors are split along the lines an operator cares about: problems with
//! the local setup (configuration, missing prior state), problems reported
//! by one of the two remote collaborators, and problems with the state
//! store itself. [`GwmError::category`] exposes that split so the CLI can
//! tell the operator where to look.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a provisioning invocation
#[derive(Error, Debug)]
pub enum GwmError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Required prior state is missing from the store
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Cloud service error
    #[error("Cloud error: {0}")]
    Cloud(#[from] CloudError),

    /// Gateway agent error
    #[error("Gateway agent error: {0}")]
    Gateway(#[from] GatewayError),

    /// State store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A later call in a multi-call transition failed after earlier state
    /// was already committed
    #[error("{committed} was committed, but a later step failed: {source}")]
    PartiallyApplied {
        /// What is now recorded (remotely and in the store)
        committed: String,
        /// The failure that interrupted the transition
        #[source]
        source: Box<GwmError>,
    },
}

impl GwmError {
    /// Classify the error for operator diagnostics
    ///
    /// A partially applied transition is classified by the failure that
    /// interrupted it.
    pub fn category(&self) -> ErrorCategory {
        match self {
            GwmError::Config(_) => ErrorCategory::Configuration,
            // The command file is operator input, not a remote failure.
            GwmError::Cloud(CloudError::InvalidCommand(_)) => ErrorCategory::Configuration,
            GwmError::Precondition(_) => ErrorCategory::Precondition,
            GwmError::Cloud(_) | GwmError::Gateway(_) => ErrorCategory::Collaborator,
            GwmError::Store(_) => ErrorCategory::Persistence,
            GwmError::PartiallyApplied { source, .. } => source.category(),
        }
    }

    /// Wrap `source` as the failure of a transition that already committed
    /// `committed`
    pub fn partially_applied(committed: impl Into<String>, source: impl Into<GwmError>) -> Self {
        GwmError::PartiallyApplied {
            committed: committed.into(),
            source: Box::new(source.into()),
        }
    }
}

/// Where an error originated, from the operator's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Fix the configuration file or command-line arguments
    Configuration,
    /// Run the command that records the missing state first
    Precondition,
    /// Investigate the cloud service or the gateway agent
    Collaborator,
    /// Investigate the local state database
    Persistence,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Precondition => write!(f, "precondition"),
            ErrorCategory::Collaborator => write!(f, "remote"),
            ErrorCategory::Persistence => write!(f, "persistence"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The config file or a command file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The requested application has no entry in the config file
    #[error("Application '{0}' is not configured")]
    UnknownApp(String),

    /// A required operator-supplied argument is missing
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Prior state a transition needs but the store does not hold
#[derive(Error, Debug)]
pub enum PreconditionError {
    /// No local gateway token; run `auth`
    #[error("no gateway agent token is stored for '{app}'. execute auth")]
    MissingToken { app: String },

    /// No gateway thing-id; run `onboard-gateway`
    #[error("no gateway id is stored for '{app}'. execute onboard-gateway")]
    MissingGatewayId { app: String },

    /// No cloud user; run `user-login`
    #[error("no login user is stored for '{app}'. execute user-login")]
    MissingUser { app: String },

    /// The vendor-id has no mapping; run `onboard-node`
    #[error("no end-node '{vendor_thing_id}' is onboarded for '{app}'. execute onboard-node")]
    UnknownNode { app: String, vendor_thing_id: String },
}

/// Errors reported while talking to the cloud service
#[derive(Error, Debug)]
pub enum CloudError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body was not what the operation expects
    #[error("malformed response: {0}")]
    Decode(String),

    /// Login was rejected
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The caller-supplied command document is not a valid command
    #[error("invalid command document: {0}")]
    InvalidCommand(String),
}

impl CloudError {
    /// The HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            CloudError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors reported while talking to the local gateway agent
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Username or password not given
    #[error("username or password is not given")]
    EmptyCredentials,

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(String),

    /// Status outside 200..=399
    #[error("failed to {operation}. ({status})")]
    Http { operation: &'static str, status: u16 },

    /// The response body was not what the operation expects
    #[error("malformed response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// The HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// State store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database could not be opened or created
    #[error("failed to open database: {0}")]
    Open(#[from] redb::DatabaseError),

    /// Transaction could not be started
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table could not be opened or created
    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    /// Read or write failed
    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    /// Commit failed; nothing was written
    #[error("commit failed: {0}")]
    Commit(#[from] redb::CommitError),

    /// A stored value could not be decoded
    #[error("corrupt value in '{namespace}' for key '{key}': {message}")]
    Corrupt {
        namespace: String,
        key: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_split() {
        let config: GwmError = ConfigError::UnknownApp("demo".into()).into();
        let precondition: GwmError = PreconditionError::MissingToken { app: "demo".into() }.into();
        let cloud: GwmError = CloudError::Http {
            status: 404,
            body: "not found".into(),
        }
        .into();
        let gateway: GwmError = GatewayError::Http {
            operation: "restore",
            status: 500,
        }
        .into();

        assert_eq!(config.category(), ErrorCategory::Configuration);
        assert_eq!(precondition.category(), ErrorCategory::Precondition);
        assert_eq!(cloud.category(), ErrorCategory::Collaborator);
        assert_eq!(gateway.category(), ErrorCategory::Collaborator);

        let bad_command: GwmError = CloudError::InvalidCommand("missing actions".into()).into();
        assert_eq!(bad_command.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_partially_applied_reports_both_halves() {
        let err = GwmError::partially_applied(
            "end-node v-100 -> en-7",
            GatewayError::Http {
                operation: "map end-node",
                status: 503,
            },
        );
        assert_eq!(err.category(), ErrorCategory::Collaborator);
        let msg = err.to_string();
        assert!(msg.contains("end-node v-100 -> en-7"));
        assert!(msg.contains("failed to map end-node. (503)"));
    }

    #[test]
    fn test_status_accessors() {
        assert_eq!(
            GatewayError::Http {
                operation: "restore",
                status: 401
            }
            .status(),
            Some(401)
        );
        assert_eq!(GatewayError::EmptyCredentials.status(), None);
        assert_eq!(CloudError::Transport("refused".into()).status(), None);
    }
}
