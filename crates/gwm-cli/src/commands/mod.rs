//! CLI command implementations

mod gateway;
mod node;
mod show;
mod user;

pub use gateway::{add_owner_command, list_pending_command, onboard_gateway_command, restore_command};
pub use node::{onboard_node_command, post_command_command, replace_node_command};
pub use show::show_db_command;
pub use user::{auth_command, user_login_command};

use std::path::{Path, PathBuf};

use gwm_client::{CloudClient, GatewayClient};
use gwm_core::config::{self, Config};
use gwm_core::error::ConfigError;
use gwm_core::{AppName, GwmError, StateStore};
use gwm_orchestrator::Provisioner;

/// Provisioner wired to the real collaborators
pub type HttpProvisioner = Provisioner<CloudClient, GatewayClient>;

/// Everything a command needs from the global options
pub struct Context {
    config: Config,
    app_name: Option<String>,
}

impl Context {
    /// Load the configuration file; `None` selects `./config.yml`
    pub fn load(config_path: Option<&Path>, app_name: Option<String>) -> Result<Self, GwmError> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config::default_config_path);
        tracing::debug!("Loading config from {}", path.display());
        let config: Config = config::load_config(&path)?;

        Ok(Self {
            config,
            app_name: app_name.filter(|name| !name.is_empty()),
        })
    }

    /// The `--app-name` value, required by every state-touching command
    pub fn app_name(&self) -> Result<AppName, ConfigError> {
        self.app_name
            .as_deref()
            .map(AppName::new)
            .ok_or(ConfigError::MissingArgument("app-name"))
    }

    pub fn app_name_opt(&self) -> Option<AppName> {
        self.app_name.as_deref().map(AppName::new)
    }

    pub fn db_path(&self) -> PathBuf {
        self.config.db_path()
    }

    pub fn open_store(&self) -> Result<StateStore, GwmError> {
        let path = self.db_path();
        tracing::debug!("Opening state database {}", path.display());
        Ok(StateStore::open(&path)?)
    }

    /// Build a provisioner for the selected application
    ///
    /// The application must be configured before the database is touched.
    pub fn provisioner(&self) -> Result<HttpProvisioner, GwmError> {
        let name = self.app_name()?;
        let app = self.config.app(name.as_str())?;
        let store = self.open_store()?;

        let cloud = CloudClient::new(app);
        let gateway = GatewayClient::new(&self.config.gateway_address, app);
        tracing::debug!(
            app = %name,
            cloud = cloud.base_url(),
            gateway = gateway.base_url(),
            "Provisioner ready"
        );
        Ok(Provisioner::new(name, store, cloud, gateway))
    }
}

/// Treat an absent flag like an empty one; the provisioner rejects both
fn arg(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}
