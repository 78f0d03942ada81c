//! In-process backend used by tests and the offline mode.
//!
//! [`StubBackend`] answers commands the way the native backend does: it holds
//! a login token, rejects data commands with the `Token expired` sentinel when
//! no session is active, filters bugs by product, and persists the login
//! configuration through a [`ConfigStore`]. Failures can be scripted per
//! command to exercise error paths. With a token file the session survives
//! restarts, the way the native backend keeps its token on disk.

use super::command::{Command, Invocation};
use super::failure::Failure;
use super::transport::Transport;
use crate::domain::error::{DeskError, Result};
use crate::domain::{Bug, Product, UserInfo};
use crate::session::classifier::TOKEN_EXPIRED;
use crate::storage::{ConfigStore, MemoryConfigStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Seed data for a [`StubBackend`], readable from a JSON file.
///
/// ```json
/// {
///   "account": "admin",
///   "password": "123456",
///   "user": { "id": 1, "type": "inside", "dept": 0, "account": "admin", "realname": "Admin", "admin": true },
///   "products": [],
///   "bugs": [],
///   "images": { "index.php?m=file&f=read&fileID=1": "data:image/png;base64,..." }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StubFixture {
    pub account: String,
    pub password: String,
    pub user: Option<UserInfo>,
    pub products: Vec<Product>,
    pub bugs: Vec<Bug>,
    pub images: HashMap<String, String>,
}

impl StubFixture {
    /// Reads a fixture from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid fixture.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| DeskError::Config(format!("invalid fixture {}: {e}", path.display())))
    }
}

struct StubState {
    account: String,
    password: String,
    logged_in: bool,
    user: Option<UserInfo>,
    products: Vec<Product>,
    bugs: Vec<Bug>,
    images: HashMap<String, String>,
    config: Box<dyn ConfigStore>,
    token_file: Option<PathBuf>,
    scripted: HashMap<&'static str, VecDeque<Failure>>,
    calls: Vec<&'static str>,
}

/// A [`Transport`] that is its own backend.
pub struct StubBackend {
    state: Mutex<StubState>,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StubBackend {
    /// Creates a logged-out backend with no data, accepting `admin`/`123456`
    /// and keeping its configuration in memory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StubState {
                account: "admin".to_string(),
                password: "123456".to_string(),
                logged_in: false,
                user: None,
                products: Vec::new(),
                bugs: Vec::new(),
                images: HashMap::new(),
                config: Box::new(MemoryConfigStore::default()),
                token_file: None,
                scripted: HashMap::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Creates a backend seeded from a fixture and persisting configuration
    /// through `config`.
    #[must_use]
    pub fn from_fixture(fixture: StubFixture, config: Box<dyn ConfigStore>) -> Self {
        let mut backend = Self::new()
            .with_credentials(fixture.account, fixture.password)
            .with_products(fixture.products)
            .with_bugs(fixture.bugs)
            .with_config_store(config);
        if let Some(user) = fixture.user {
            backend = backend.with_user(user);
        }
        for (path, data) in fixture.images {
            backend = backend.with_image(path, data);
        }
        backend
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn with_credentials(self, account: impl Into<String>, password: impl Into<String>) -> Self {
        {
            let mut state = self.state();
            state.account = account.into();
            state.password = password.into();
        }
        self
    }

    #[must_use]
    pub fn with_user(self, user: UserInfo) -> Self {
        self.state().user = Some(user);
        self
    }

    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.state().products = products;
        self
    }

    /// Seeds bugs, deriving their display timestamps as the backend does.
    #[must_use]
    pub fn with_bugs(self, bugs: Vec<Bug>) -> Self {
        self.state().bugs = bugs.into_iter().map(Bug::with_display_times).collect();
        self
    }

    #[must_use]
    pub fn with_image(self, path: impl Into<String>, data: impl Into<String>) -> Self {
        self.state().images.insert(path.into(), data.into());
        self
    }

    #[must_use]
    pub fn with_config_store(self, config: Box<dyn ConfigStore>) -> Self {
        self.state().config = config;
        self
    }

    /// Persists the session token as a marker file at `path`.
    ///
    /// `initialize_app` restores the session when the file exists; login
    /// writes it and logout removes it.
    #[must_use]
    pub fn with_token_file(self, path: impl Into<PathBuf>) -> Self {
        self.state().token_file = Some(path.into());
        self
    }

    /// Starts with an active session, as if a token was restored from disk.
    #[must_use]
    pub fn logged_in(self) -> Self {
        self.state().logged_in = true;
        self
    }

    /// Makes the next call of `command` (wire name) fail with `failure`.
    /// Several scripted failures for one command are used in order.
    pub fn fail_next(&self, command: &'static str, failure: impl Into<Failure>) {
        self.state()
            .scripted
            .entry(command)
            .or_default()
            .push_back(failure.into());
    }

    /// Drops the session token, so data commands answer `Token expired`.
    pub fn expire_session(&self) {
        self.state().logged_in = false;
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.state().logged_in
    }

    /// Wire names of every command received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    fn answer(state: &mut StubState, command: Command) -> std::result::Result<Value, Failure> {
        match command {
            Command::InitializeApp => {
                if let Some(path) = &state.token_file {
                    state.logged_in = state.logged_in || path.exists();
                }
                encode(&state.logged_in)
            }
            Command::LoginZentao {
                base_url,
                account,
                password,
            } => {
                let accepted = account == state.account && password == state.password;
                tracing::debug!(base_url = %base_url, account = %account, accepted = accepted, "stub login");
                state.logged_in = accepted;
                if accepted {
                    if let Some(path) = &state.token_file {
                        std::fs::write(path, &account)
                            .map_err(|e| Failure::message(format!("failed to save token: {e}")))?;
                    }
                }
                encode(&accepted)
            }
            Command::LogoutZentao => {
                state.logged_in = false;
                if let Some(path) = &state.token_file {
                    if let Err(e) = std::fs::remove_file(path) {
                        tracing::debug!(error = %e, "no token file to remove");
                    }
                }
                Ok(Value::Null)
            }
            Command::CheckLoginStatus => encode(&state.logged_in),
            Command::SaveConfig { config } => state
                .config
                .save(&config)
                .map(|()| Value::Null)
                .map_err(|e| Failure::message(e.to_string())),
            Command::LoadConfig => state
                .config
                .load()
                .map_err(|e| Failure::message(e.to_string()))
                .and_then(|config| encode(&config)),
            _ if !state.logged_in => Err(Failure::message(TOKEN_EXPIRED)),
            Command::GetUserInfo => state
                .user
                .as_ref()
                .ok_or_else(|| Failure::message("user info unavailable"))
                .and_then(encode),
            Command::GetProducts => encode(&state.products),
            Command::GetProductDetail { product_id } => state
                .products
                .iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| Failure::message(format!("product {product_id} not found")))
                .and_then(encode),
            Command::GetBugsByProduct { product_ids } => {
                let bugs: Vec<&Bug> = state
                    .bugs
                    .iter()
                    .filter(|bug| bug.product.is_some_and(|p| product_ids.contains(&p)))
                    .collect();
                encode(&bugs)
            }
            Command::GetBugDetail { bug_id } => state
                .bugs
                .iter()
                .find(|bug| bug.id == bug_id)
                .ok_or_else(|| Failure::message(format!("bug {bug_id} not found")))
                .and_then(encode),
            Command::GetImage { image_path } => state
                .images
                .get(&image_path)
                .ok_or_else(|| Failure::message(format!("image {image_path} not found")))
                .and_then(encode),
        }
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> std::result::Result<Value, Failure> {
    serde_json::to_value(value).map_err(|e| Failure::message(format!("failed to encode result: {e}")))
}

#[async_trait]
impl Transport for StubBackend {
    async fn invoke(&self, invocation: Invocation) -> std::result::Result<Value, Failure> {
        // Suspend once like a real round trip would.
        tokio::task::yield_now().await;

        let mut state = self.state();
        let name = invocation.command.name();
        state.calls.push(name);

        if let Some(failure) = state.scripted.get_mut(name).and_then(VecDeque::pop_front) {
            tracing::debug!(command = name, failure = %failure, "stub scripted failure");
            return Err(failure);
        }

        Self::answer(&mut state, invocation.command)
    }
}

impl std::fmt::Debug for StubBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubBackend").finish_non_exhaustive()
    }
}
