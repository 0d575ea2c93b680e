//! gw-manager: operator CLI for gateway provisioning
//!
//! Wires the YAML configuration, the state database and the HTTP clients
//! into a [`gwm_orchestrator::Provisioner`] and renders the results.

pub mod commands;
pub mod output;
