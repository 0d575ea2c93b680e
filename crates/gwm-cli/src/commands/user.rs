//! user-login and auth

use gwm_core::types::redact;
use gwm_core::GwmError;

use super::{arg, Context};
use crate::output::print_success;

/// Register and log in the cloud user that will own the gateway
pub async fn user_login_command(
    ctx: &Context,
    username: &Option<String>,
    password: &Option<String>,
) -> Result<(), GwmError> {
    let provisioner = ctx.provisioner()?;
    let user = provisioner.login(arg(username), arg(password)).await?;

    print_success(&format!(
        "Logged in as {} (token {}); stored for '{}'",
        user.id,
        redact(&user.token),
        provisioner.app()
    ));
    Ok(())
}

/// Obtain a gateway agent token
pub async fn auth_command(
    ctx: &Context,
    username: &Option<String>,
    password: &Option<String>,
) -> Result<(), GwmError> {
    let provisioner = ctx.provisioner()?;
    provisioner
        .authenticate(arg(username), arg(password))
        .await?;

    print_success(&format!(
        "Gateway agent token stored for '{}'",
        provisioner.app()
    ));
    Ok(())
}
