//! zentao-desk: session-aware data fetching for a ZenTao desktop client.
//!
//! The crate sits between a user interface and a native backend that talks
//! to a ZenTao issue tracker server. It provides:
//! - A typed command bridge to the backend, over a child process or in-process
//! - Resource containers for bugs, products and the user profile, each with a
//!   busy flag and user-visible notices
//! - Detection of expired sessions and an observable session state
//! - Persistence of the remembered login configuration
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI (main.rs)                                      │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Desk facade
//! │  - Bootstrap, login, logout                         │
//! │  - One-shot detail lookups                          │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Store Layer   │   │ Session Layer │   │ Bridge Layer  │
//! │ (store/)      │   │ (session/)    │   │ (bridge/)     │
//! │ - Resources   │   │ - Classifier  │   │ - Commands    │
//! │ - Notices     │   │ - State watch │   │ - Transports  │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure, Storage & Domain Layers            │
//! │  - Platform paths (infrastructure/)                 │
//! │  - Config persistence (storage/)                    │
//! │  - Entities and errors (domain/)                    │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - OpenTelemetry tracing to a JSON lines file       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: The [`Desk`] facade
//! - [`bridge`]: Commands, transports and the typed [`CommandBridge`]
//! - [`domain`]: Entities and error types
//! - [`infrastructure`]: Platform paths
//! - [`session`]: Failure classification and session state
//! - [`storage`]: Login configuration persistence
//! - [`store`]: Resource state containers and notices
//! - [`observability`]: Tracing setup
//!
//! # Configuration
//!
//! Settings are read from `<config_dir>/zentao-desk/settings.toml`:
//!
//! ```toml
//! backend_program = "zentao-backend"
//! backend_args = ["--stdio"]
//! trace_level = "debug"
//! data_dir = "~/.local/share/zentao-desk"
//! log_to_stderr = false
//! ```
//!
//! # Session Handling
//!
//! The backend reports an expired or rejected session with the exact failure
//! strings `"Token expired"` and `"Unauthorized"`. Reporting containers turn
//! those into [`LoginRequired`] and mark the session expired; while it stays
//! expired they answer [`LoginRequired`] without contacting the backend. A
//! successful login or fetch marks it authenticated again.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use zentao_desk::bridge::StubBackend;
//! use zentao_desk::store::TracingNotifier;
//! use zentao_desk::{Desk, LoginConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let desk = Desk::new(Arc::new(StubBackend::new()), Arc::new(TracingNotifier));
//! let config = LoginConfig::new("http://zentao.local", "admin", "123456");
//!
//! assert!(desk.login(&config, false).await?);
//! desk.products().refresh().await?;
//! assert!(desk.products().value().is_empty());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod bridge;
pub mod domain;
pub mod infrastructure;
pub mod session;
pub mod storage;
pub mod store;

pub mod observability;

pub use app::Desk;
pub use bridge::{CommandBridge, Failure, ProcessTransport, StubBackend, Transport};
pub use domain::{Bug, DeskError, LoginConfig, LoginRequired, Product, Result, UserInfo};
pub use session::{SessionManager, SessionState};
pub use store::{Notice, NoticeLevel, Notifier};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Client settings, usually read from a TOML file.
///
/// Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Backend executable speaking newline-delimited JSON on stdio.
    ///
    /// Default: `"zentao-backend"`, looked up on `PATH`.
    pub backend_program: String,

    /// Arguments passed to the backend executable.
    pub backend_args: Vec<String>,

    /// Filter for traces and logs when `RUST_LOG` is not set.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or any
    /// `EnvFilter` directive. Default: `"info"`
    pub trace_level: Option<String>,

    /// Directory for the saved configuration and traces. A leading `~` is
    /// expanded. Default: the platform data directory.
    pub data_dir: Option<String>,

    /// Also print log events to stderr.
    pub log_to_stderr: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_program: "zentao-backend".to_string(),
            backend_args: Vec::new(),
            trace_level: None,
            data_dir: None,
            log_to_stderr: false,
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Config`] when the text is not valid settings TOML.
    ///
    /// # Example
    ///
    /// ```rust
    /// use zentao_desk::Settings;
    ///
    /// let settings = Settings::from_toml_str("trace_level = \"debug\"")?;
    /// assert_eq!(settings.trace_level.as_deref(), Some("debug"));
    /// assert_eq!(settings.backend_program, "zentao-backend");
    /// # Ok::<(), zentao_desk::DeskError>(())
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| DeskError::Config(e.to_string()))
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| DeskError::Config(format!("{}: {e}", path.display())))
    }

    /// Loads settings from `path`, or from the default settings file.
    ///
    /// A missing default file yields default settings; an explicitly given
    /// file must exist.
    ///
    /// # Errors
    ///
    /// Returns an error when a settings file exists but is invalid, or when an
    /// explicit file cannot be read.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let default_path = infrastructure::settings_file();
        if default_path.exists() {
            tracing::debug!(path = ?default_path, "loading settings");
            Self::from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolved data directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map_or_else(infrastructure::default_data_dir, infrastructure::expand_tilde)
    }
}

/// Starts the configured backend process and builds a [`Desk`] on it.
///
/// # Errors
///
/// Returns [`DeskError::Transport`] when the backend cannot be started.
pub fn connect(settings: &Settings, notifier: Arc<dyn Notifier>) -> Result<Desk> {
    tracing::debug!(
        program = %settings.backend_program,
        args = ?settings.backend_args,
        "starting backend"
    );
    let transport = ProcessTransport::spawn(&settings.backend_program, &settings.backend_args)?;
    Ok(Desk::new(Arc::new(transport), notifier))
}

/// Builds a [`Desk`] on an in-process backend seeded from a JSON fixture.
///
/// The login configuration and session token are kept in the data
/// directory, so a session survives between runs as with the real backend.
///
/// # Errors
///
/// Returns an error when the fixture cannot be read or the data directory
/// cannot be created.
pub fn connect_offline(settings: &Settings, fixture: &Path, notifier: Arc<dyn Notifier>) -> Result<Desk> {
    let data_dir = settings.data_dir();
    let fixture = bridge::StubFixture::from_file(fixture)?;
    let store = storage::JsonConfigStore::new(infrastructure::config_file(&data_dir))?;
    let backend = StubBackend::from_fixture(fixture, Box::new(store))
        .with_token_file(infrastructure::token_file(&data_dir));

    tracing::debug!(data_dir = ?data_dir, "using offline backend");
    Ok(Desk::new(Arc::new(backend), notifier))
}
