//! End-node commands

use std::path::Path;

use gwm_core::error::ConfigError;
use gwm_core::GwmError;
use gwm_orchestrator::NodeRegistration;

use super::{arg, Context};
use crate::output::print_success;

/// Onboard an end-node under the gateway and map it on the agent
pub async fn onboard_node_command(
    ctx: &Context,
    node_vid: &Option<String>,
    node_password: &Option<String>,
    thing_type: Option<String>,
    firmware_version: Option<String>,
) -> Result<(), GwmError> {
    let provisioner = ctx.provisioner()?;
    let registration = NodeRegistration {
        vendor_thing_id: arg(node_vid).to_string(),
        password: arg(node_password).to_string(),
        thing_type,
        firmware_version,
    };

    let mapping = provisioner.onboard_node(registration).await?;
    print_success(&format!("Onboarded {}", mapping));
    Ok(())
}

/// Send the command described by `command_file` to an onboarded end-node
pub async fn post_command_command(
    ctx: &Context,
    node_vid: &Option<String>,
    command_file: &Path,
) -> Result<(), GwmError> {
    let provisioner = ctx.provisioner()?;
    let document = std::fs::read(command_file).map_err(|source| ConfigError::Read {
        path: command_file.to_path_buf(),
        source,
    })?;

    let receipt = provisioner.post_command(arg(node_vid), &document).await?;
    print_success(&format!("Command posted: {}", receipt.command_id));
    Ok(())
}

/// Move an end-node's cloud identity to new hardware
pub async fn replace_node_command(
    ctx: &Context,
    node_vid: &Option<String>,
    new_vid: &Option<String>,
    node_password: &Option<String>,
) -> Result<(), GwmError> {
    let provisioner = ctx.provisioner()?;
    let mapping = provisioner
        .replace_node(arg(node_vid), arg(new_vid), arg(node_password))
        .await?;
    print_success(&format!("Replaced {} with {}", arg(node_vid), mapping));
    Ok(())
}
