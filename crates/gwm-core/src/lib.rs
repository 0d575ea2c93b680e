//! gwm-core: Core abstractions and configuration for gw-manager
//!
//! This crate provides the domain types, error taxonomy, YAML
//! configuration, the persistent state store and the collaborator traits
//! shared by the clients, the orchestrator and the CLI.

pub mod command;
pub mod config;
pub mod error;
pub mod store;
pub mod traits;
pub mod types;

pub use command::{CommandReceipt, CommandRequest};
pub use error::{ErrorCategory, GwmError};
pub use store::StateStore;
pub use types::{AppName, NodeMapping, ThingId, User, UserId, VendorThingId};
