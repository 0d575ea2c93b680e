//! Output formatting utilities for the CLI
//!
//! Tables for pending end-nodes and database dumps, and the colored status
//! lines every command reports through. Results go to stdout; errors and
//! warnings go to stderr.

use serde_json::Value;
use tabled::{
    settings::{Style, Width},
    Table, Tabled,
};

use gwm_core::store::NamespaceKind;
use gwm_core::types::redact;
use gwm_core::User;

/// Format the agent's pending end-nodes as an ASCII table
///
/// The agent decides what a pending entry contains, so the vendor thing id
/// is pulled out when present and the whole entry is shown next to it.
pub fn format_pending_nodes(nodes: &[Value]) -> String {
    if nodes.is_empty() {
        return "No pending end-nodes".to_string();
    }

    #[derive(Tabled)]
    struct PendingRow {
        #[tabled(rename = "VENDOR THING ID")]
        vendor_thing_id: String,
        #[tabled(rename = "DETAILS")]
        details: String,
    }

    let rows: Vec<PendingRow> = nodes
        .iter()
        .map(|node| PendingRow {
            vendor_thing_id: node
                .get("vendorThingID")
                .and_then(Value::as_str)
                .unwrap_or("-")
                .to_string(),
            details: node.to_string(),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Width::wrap(100))
        .to_string()
}

/// Format the entries of one namespace as a KEY / VALUE table
///
/// Tokens are redacted, including the one inside a stored login user.
pub fn format_entries(kind: NamespaceKind, entries: &[(String, String)]) -> String {
    if entries.is_empty() {
        return format!("No entries in '{}'", kind);
    }

    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "KEY")]
        key: String,
        #[tabled(rename = "VALUE")]
        value: String,
    }

    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|(key, value)| EntryRow {
            key: key.clone(),
            value: display_value(kind, value),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn display_value(kind: NamespaceKind, value: &str) -> String {
    match kind {
        NamespaceKind::Tokens => redact(value),
        NamespaceKind::Users => match serde_json::from_str::<User>(value) {
            Ok(user) => format!("id={} token={}", user.id, redact(&user.token)),
            Err(_) => "<unreadable user record>".to_string(),
        },
        NamespaceKind::GatewayIds | NamespaceKind::Nodes => value.to_string(),
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
///
/// Outputs to stderr.
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_nodes_table() {
        assert_eq!(format_pending_nodes(&[]), "No pending end-nodes");

        let table = format_pending_nodes(&[
            json!({"vendorThingID": "v-300", "thingType": "sensor"}),
            json!({"unexpected": true}),
        ]);
        assert!(table.contains("VENDOR THING ID"));
        assert!(table.contains("v-300"));
        assert!(table.contains("-"));
    }

    #[test]
    fn test_entries_redact_tokens() {
        let table = format_entries(
            NamespaceKind::Tokens,
            &[("demo".to_string(), "0123456789abcdef".to_string())],
        );
        assert!(table.contains("demo"));
        assert!(!table.contains("0123456789abcdef"));

        let table = format_entries(
            NamespaceKind::Users,
            &[(
                "demo".to_string(),
                r#"{"id":"u1","token":"secret-user-token"}"#.to_string(),
            )],
        );
        assert!(table.contains("id=u1"));
        assert!(!table.contains("secret-user-token"));
    }

    #[test]
    fn test_entries_show_ids_verbatim() {
        let table = format_entries(
            NamespaceKind::Nodes,
            &[("v-100".to_string(), "en-7".to_string())],
        );
        assert!(table.contains("v-100"));
        assert!(table.contains("en-7"));

        assert_eq!(
            format_entries(NamespaceKind::GatewayIds, &[]),
            "No entries in 'gateway-ids'"
        );
    }
}
