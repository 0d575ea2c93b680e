//! gwm-orchestrator: the provisioning workflow
//!
//! Provisioning a gateway is a sequence of operator commands (login,
//! authenticate, onboard the gateway, add the owner, onboard end-nodes,
//! ...). Each command is one transition of a per-application record kept
//! in the state store, so steps can be run independently and resumed after
//! a failure.
//!
//! [`Provisioner`] implements those transitions on top of the collaborator
//! traits from `gwm-core`; it never talks HTTP itself.

pub mod provisioner;

pub use provisioner::{NodeRegistration, Provisioner};
