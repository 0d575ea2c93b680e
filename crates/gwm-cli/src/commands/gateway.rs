//! Gateway-level commands

use gwm_core::GwmError;

use super::{arg, Context};
use crate::output::{format_pending_nodes, print_info, print_success};

pub async fn onboard_gateway_command(ctx: &Context) -> Result<(), GwmError> {
    let provisioner = ctx.provisioner()?;
    let thing_id = provisioner.onboard_gateway().await?;
    print_success(&format!("Gateway onboarded: {}", thing_id));
    Ok(())
}

/// Make the logged-in user the gateway's owner
pub async fn add_owner_command(
    ctx: &Context,
    gateway_password: &Option<String>,
) -> Result<(), GwmError> {
    let provisioner = ctx.provisioner()?;
    provisioner.add_owner(arg(gateway_password)).await?;
    print_success("Gateway owner added");
    Ok(())
}

pub async fn list_pending_command(ctx: &Context) -> Result<(), GwmError> {
    let provisioner = ctx.provisioner()?;
    let nodes = provisioner.list_pending_nodes().await?;

    print_info(&format!("{} pending end-node(s)", nodes.len()));
    println!("{}", format_pending_nodes(&nodes));
    Ok(())
}

pub async fn restore_command(ctx: &Context) -> Result<(), GwmError> {
    let provisioner = ctx.provisioner()?;
    provisioner.restore().await?;
    print_success("Gateway restore requested");
    Ok(())
}
