//! gw-manager CLI
//!
//! One provisioning step per invocation:
//! - cloud user login and gateway agent authentication
//! - gateway onboarding and ownership
//! - end-node onboarding, commands and replacement
//! - inspection of the local state database

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gw_manager::commands::{self, Context};
use gw_manager::output::{print_error, print_warning};
use gwm_core::store::NamespaceKind;
use gwm_core::{ErrorCategory, GwmError};

#[derive(Parser)]
#[command(name = "gw-manager")]
#[command(author, version, about = "Gateway and end-node provisioning manager")]
#[command(propagate_version = true)]
struct Cli {
    /// Path of the YAML configuration file [default: ./config.yml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Application name as configured under `apps`
    #[arg(long, global = true, env = "GWM_APP_NAME")]
    app_name: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register and log in the cloud user that will own the gateway
    #[command(alias = "login")]
    UserLogin {
        /// Gateway owner user name (cloud user)
        #[arg(long)]
        username: Option<String>,
        /// Gateway owner password (cloud user)
        #[arg(long)]
        password: Option<String>,
    },

    /// Obtain a token from the gateway agent
    Auth {
        /// Gateway admin user name
        #[arg(long)]
        username: Option<String>,
        /// Gateway admin password
        #[arg(long)]
        password: Option<String>,
    },

    /// Onboard the gateway through the gateway agent
    OnboardGateway,

    /// Make the logged-in user the owner of the gateway
    AddOwner {
        /// Gateway password, as configured on the gateway agent
        #[arg(long)]
        gateway_password: Option<String>,
    },

    /// List end-nodes connected to the gateway but not onboarded yet
    #[command(alias = "l")]
    ListPendingNodes,

    /// Onboard an end-node and map it on the gateway agent
    #[command(alias = "on")]
    OnboardNode {
        /// End-node vendor thing id
        #[arg(long)]
        node_vid: Option<String>,
        /// End-node password
        #[arg(long)]
        node_password: Option<String>,
        /// End-node thing type
        #[arg(long)]
        thing_type: Option<String>,
        /// End-node firmware version
        #[arg(long)]
        firmware_version: Option<String>,
    },

    /// Send a command to an onboarded end-node
    #[command(alias = "s")]
    PostCommand {
        /// End-node vendor thing id
        #[arg(long)]
        node_vid: Option<String>,
        /// JSON file describing the command
        #[arg(long, default_value = "command.json")]
        command_file: PathBuf,
    },

    /// Put the gateway agent into restore mode
    #[command(alias = "r")]
    Restore,

    /// Replace an end-node with new hardware, keeping its thing id
    #[command(alias = "rp")]
    ReplaceNode {
        /// Vendor thing id of the end-node being replaced
        #[arg(long)]
        node_vid: Option<String>,
        /// Vendor thing id of the new end-node
        #[arg(long)]
        new_vid: Option<String>,
        /// End-node password
        #[arg(long)]
        node_password: Option<String>,
    },

    /// Show the entries of one namespace of the state database
    #[command(alias = "db")]
    ShowDb {
        /// tokens, gateway-ids, users or nodes
        #[arg(long, alias = "bucket")]
        namespace: NamespaceKind,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), GwmError> {
    let ctx = Context::load(cli.config.as_deref(), cli.app_name)?;

    match cli.command {
        Commands::UserLogin { username, password } => {
            commands::user_login_command(&ctx, &username, &password).await
        }
        Commands::Auth { username, password } => {
            commands::auth_command(&ctx, &username, &password).await
        }
        Commands::OnboardGateway => commands::onboard_gateway_command(&ctx).await,
        Commands::AddOwner { gateway_password } => {
            commands::add_owner_command(&ctx, &gateway_password).await
        }
        Commands::ListPendingNodes => commands::list_pending_command(&ctx).await,
        Commands::OnboardNode {
            node_vid,
            node_password,
            thing_type,
            firmware_version,
        } => {
            commands::onboard_node_command(
                &ctx,
                &node_vid,
                &node_password,
                thing_type,
                firmware_version,
            )
            .await
        }
        Commands::PostCommand {
            node_vid,
            command_file,
        } => commands::post_command_command(&ctx, &node_vid, &command_file).await,
        Commands::Restore => commands::restore_command(&ctx).await,
        Commands::ReplaceNode {
            node_vid,
            new_vid,
            node_password,
        } => commands::replace_node_command(&ctx, &node_vid, &new_vid, &node_password).await,
        Commands::ShowDb { namespace } => commands::show_db_command(&ctx, namespace),
    }
}

fn report(e: &GwmError) {
    let category = e.category();
    print_error(&format!("{} [{}]", e, category));

    if let GwmError::PartiallyApplied { .. } = e {
        print_warning("State committed before the failure was kept");
    }
    match category {
        ErrorCategory::Configuration => {
            print_warning("Check the configuration file and command-line arguments")
        }
        ErrorCategory::Collaborator => {
            print_warning("The remote service rejected the request or could not be reached")
        }
        ErrorCategory::Precondition | ErrorCategory::Persistence => {}
    }
}
