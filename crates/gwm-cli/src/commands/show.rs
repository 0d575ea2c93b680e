//! show-db command

use gwm_core::store::{Namespace, NamespaceKind};
use gwm_core::{AppName, GwmError};

use super::Context;
use crate::output::format_entries;

/// Dump one namespace of the state database
///
/// Only `nodes` needs `--app-name`; the shared namespaces are listed for
/// every application.
pub fn show_db_command(ctx: &Context, kind: NamespaceKind) -> Result<(), GwmError> {
    let app = match kind {
        NamespaceKind::Nodes => ctx.app_name()?,
        _ => ctx.app_name_opt().unwrap_or_else(|| AppName::new("")),
    };
    let store = ctx.open_store()?;

    let entries = store.entries(&Namespace::new(kind, app))?;
    println!("{}", format_entries(kind, &entries));
    Ok(())
}
