//! In-memory collaborators with switchable failures

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use gwm_core::error::{CloudError, GatewayError};
use gwm_core::traits::{CloudApi, GatewayApi};
use gwm_core::types::{EndNodeOnboarding, UserId};
use gwm_core::{
    AppName, CommandReceipt, CommandRequest, StateStore, ThingId, User, VendorThingId,
};
use gwm_orchestrator::Provisioner;

#[derive(Debug)]
pub struct CloudState {
    pub user: User,
    pub end_node_id: String,
    pub fail_register: bool,
    pub fail_login: bool,
    pub fail_onboard: bool,
    pub fail_assign: bool,
    pub fail_update_vid: bool,
    pub fail_post: bool,
    pub registrations: Vec<String>,
    pub onboardings: Vec<EndNodeOnboarding>,
    pub owners: Vec<(ThingId, String, UserId)>,
    pub vid_updates: Vec<(ThingId, VendorThingId)>,
    pub commands: Vec<(ThingId, CommandRequest)>,
}

impl Default for CloudState {
    fn default() -> Self {
        Self {
            user: User {
                id: UserId::new("u1"),
                token: "t1".into(),
            },
            end_node_id: "en-7".into(),
            fail_register: false,
            fail_login: false,
            fail_onboard: false,
            fail_assign: false,
            fail_update_vid: false,
            fail_post: false,
            registrations: Vec::new(),
            onboardings: Vec::new(),
            owners: Vec::new(),
            vid_updates: Vec::new(),
            commands: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeCloud(Arc<Mutex<CloudState>>);

impl FakeCloud {
    pub fn state(&self) -> MutexGuard<'_, CloudState> {
        self.0.lock().unwrap()
    }
}

fn rejected(status: u16) -> CloudError {
    CloudError::Http {
        status,
        body: "rejected".into(),
    }
}

#[async_trait]
impl CloudApi for FakeCloud {
    async fn register_user(&self, username: &str, _password: &str) -> Result<(), CloudError> {
        let mut state = self.state();
        state.registrations.push(username.to_string());
        if state.fail_register {
            return Err(rejected(409));
        }
        Ok(())
    }

    async fn login_user(&self, _username: &str, _password: &str) -> Result<User, CloudError> {
        let state = self.state();
        if state.fail_login {
            return Err(rejected(400));
        }
        Ok(state.user.clone())
    }

    async fn onboard_end_node(
        &self,
        _user: &User,
        request: &EndNodeOnboarding,
    ) -> Result<ThingId, CloudError> {
        let mut state = self.state();
        if state.fail_onboard {
            return Err(rejected(404));
        }
        state.onboardings.push(request.clone());
        Ok(ThingId::new(state.end_node_id.clone()))
    }

    async fn assign_owner(
        &self,
        user: &User,
        thing_id: &ThingId,
        thing_password: &str,
    ) -> Result<(), CloudError> {
        let mut state = self.state();
        if state.fail_assign {
            return Err(rejected(403));
        }
        state
            .owners
            .push((thing_id.clone(), thing_password.to_string(), user.id.clone()));
        Ok(())
    }

    async fn update_vendor_thing_id(
        &self,
        _user: &User,
        thing_id: &ThingId,
        new_vendor_thing_id: &VendorThingId,
        _password: &str,
    ) -> Result<(), CloudError> {
        let mut state = self.state();
        if state.fail_update_vid {
            return Err(rejected(404));
        }
        state
            .vid_updates
            .push((thing_id.clone(), new_vendor_thing_id.clone()));
        Ok(())
    }

    async fn post_command(
        &self,
        _user: &User,
        thing_id: &ThingId,
        command: &CommandRequest,
    ) -> Result<CommandReceipt, CloudError> {
        let mut state = self.state();
        if state.fail_post {
            return Err(rejected(404));
        }
        state.commands.push((thing_id.clone(), command.clone()));
        Ok(CommandReceipt {
            command_id: format!("cmd-{}", state.commands.len()),
        })
    }
}

#[derive(Debug)]
pub struct GatewayState {
    pub token: String,
    pub gateway_id: String,
    pub pending: Vec<serde_json::Value>,
    pub fail_login: bool,
    pub fail_onboard: bool,
    pub fail_map: bool,
    pub fail_replace: bool,
    pub fail_restore: bool,
    pub calls: Vec<String>,
    pub maps: Vec<(VendorThingId, ThingId)>,
    pub replaces: Vec<(ThingId, VendorThingId)>,
    pub tokens_seen: Vec<String>,
}

impl Default for GatewayState {
    fn default() -> Self {
        Self {
            token: "loc-tok".into(),
            gateway_id: "gw-42".into(),
            pending: Vec::new(),
            fail_login: false,
            fail_onboard: false,
            fail_map: false,
            fail_replace: false,
            fail_restore: false,
            calls: Vec::new(),
            maps: Vec::new(),
            replaces: Vec::new(),
            tokens_seen: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeGateway(Arc<Mutex<GatewayState>>);

impl FakeGateway {
    pub fn state(&self) -> MutexGuard<'_, GatewayState> {
        self.0.lock().unwrap()
    }

    fn enter(&self, call: &str, token: Option<&str>) -> MutexGuard<'_, GatewayState> {
        let mut state = self.state();
        state.calls.push(call.to_string());
        if let Some(token) = token {
            state.tokens_seen.push(token.to_string());
        }
        state
    }
}

#[async_trait]
impl GatewayApi for FakeGateway {
    async fn local_login(&self, _username: &str, _password: &str) -> Result<String, GatewayError> {
        let state = self.enter("login", None);
        if state.fail_login {
            return Err(GatewayError::Http {
                operation: "authenticate",
                status: 401,
            });
        }
        Ok(state.token.clone())
    }

    async fn onboard_gateway(&self, token: &str) -> Result<ThingId, GatewayError> {
        let state = self.enter("onboard", Some(token));
        if state.fail_onboard {
            return Err(GatewayError::Http {
                operation: "onboard gateway",
                status: 401,
            });
        }
        Ok(ThingId::new(state.gateway_id.clone()))
    }

    async fn map_end_node(
        &self,
        token: &str,
        vendor_thing_id: &VendorThingId,
        thing_id: &ThingId,
    ) -> Result<(), GatewayError> {
        let mut state = self.enter("map", Some(token));
        if state.fail_map {
            return Err(GatewayError::Http {
                operation: "map end-node",
                status: 503,
            });
        }
        state.maps.push((vendor_thing_id.clone(), thing_id.clone()));
        Ok(())
    }

    async fn replace_end_node(
        &self,
        token: &str,
        thing_id: &ThingId,
        new_vendor_thing_id: &VendorThingId,
    ) -> Result<(), GatewayError> {
        let mut state = self.enter("replace", Some(token));
        if state.fail_replace {
            return Err(GatewayError::Http {
                operation: "replace end-node",
                status: 500,
            });
        }
        state
            .replaces
            .push((thing_id.clone(), new_vendor_thing_id.clone()));
        Ok(())
    }

    async fn list_pending_end_nodes(
        &self,
        token: &str,
    ) -> Result<Vec<serde_json::Value>, GatewayError> {
        let state = self.enter("pending", Some(token));
        Ok(state.pending.clone())
    }

    async fn restore(&self, token: &str) -> Result<(), GatewayError> {
        let state = self.enter("restore", Some(token));
        if state.fail_restore {
            return Err(GatewayError::Http {
                operation: "restore",
                status: 409,
            });
        }
        Ok(())
    }
}

/// Collects formatted log lines emitted on the current thread
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route `warn!` and above to this capture until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub struct Harness {
    pub provisioner: Provisioner<FakeCloud, FakeGateway>,
    pub cloud: FakeCloud,
    pub gateway: FakeGateway,
}

impl Harness {
    pub fn new(app: &str) -> Self {
        Self::with_store(app, StateStore::in_memory().unwrap())
    }

    pub fn with_store(app: &str, store: StateStore) -> Self {
        let cloud = FakeCloud::default();
        let gateway = FakeGateway::default();
        let provisioner =
            Provisioner::new(AppName::new(app), store, cloud.clone(), gateway.clone());
        Self {
            provisioner,
            cloud,
            gateway,
        }
    }

    /// Run login, authenticate and onboard-gateway
    pub async fn bootstrap(&self) {
        self.provisioner.login("alice", "pw").await.unwrap();
        self.provisioner.authenticate("admin", "pw2").await.unwrap();
        self.provisioner.onboard_gateway().await.unwrap();
    }

    pub fn nodes(&self) -> Vec<(String, String)> {
        let app = self.provisioner.app().clone();
        self.provisioner
            .store()
            .view(|r| r.nodes(&app))
            .unwrap()
            .into_iter()
            .map(|m| (m.vendor_thing_id.0, m.thing_id.0))
            .collect()
    }
}
