//! Commands understood by the native backend.
//!
//! Every backend capability is one [`Command`] variant. Commands serialize as
//! `{"command": "<name>", "args": {...}}` with the backend's camelCase
//! argument names; commands without arguments omit `args`. An [`Invocation`]
//! pairs a command with the caller's trace context so backend spans can join
//! the caller's trace.

use crate::domain::LoginConfig;
use serde::{Deserialize, Serialize};

/// Distributed tracing context carried with each invocation.
///
/// Captures the current OpenTelemetry trace and span IDs so the backend can
/// parent its own spans under the client span that issued the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a 32 character hex string.
    pub trace_id: String,

    /// ID of the client span that issued the command, 16 hex characters.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// Returns `None` when no OpenTelemetry layer is installed or the current
    /// span context is not valid.
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }
}

/// A named backend command with its typed arguments.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum Command {
    /// Loads persisted state in the backend. Result: `bool`.
    InitializeApp,

    /// Logs in to the ZenTao server. Result: `bool`.
    #[serde(rename_all = "camelCase")]
    LoginZentao {
        base_url: String,
        account: String,
        password: String,
    },

    /// Drops the backend session. Result: nothing.
    LogoutZentao,

    /// Reports whether the backend holds a valid token. Result: `bool`.
    CheckLoginStatus,

    /// Result: `UserInfo`.
    GetUserInfo,

    /// Result: list of `Product`.
    GetProducts,

    /// Result: `Product`.
    #[serde(rename_all = "camelCase")]
    GetProductDetail { product_id: u32 },

    /// Result: list of `Bug` for all given products, in backend order.
    #[serde(rename_all = "camelCase")]
    GetBugsByProduct { product_ids: Vec<u32> },

    /// Result: `Bug`.
    #[serde(rename_all = "camelCase")]
    GetBugDetail { bug_id: u32 },

    /// Result: encoded image data or a reference, as a string.
    #[serde(rename_all = "camelCase")]
    GetImage { image_path: String },

    /// Persists the login configuration. Result: nothing.
    SaveConfig { config: LoginConfig },

    /// Result: `LoginConfig` or `null`.
    LoadConfig,
}

impl Command {
    /// Returns the wire name of the command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InitializeApp => "initialize_app",
            Self::LoginZentao { .. } => "login_zentao",
            Self::LogoutZentao => "logout_zentao",
            Self::CheckLoginStatus => "check_login_status",
            Self::GetUserInfo => "get_user_info",
            Self::GetProducts => "get_products",
            Self::GetProductDetail { .. } => "get_product_detail",
            Self::GetBugsByProduct { .. } => "get_bugs_by_product",
            Self::GetBugDetail { .. } => "get_bug_detail",
            Self::GetImage { .. } => "get_image",
            Self::SaveConfig { .. } => "save_config",
            Self::LoadConfig => "load_config",
        }
    }
}

impl std::fmt::Debug for Command {
    /// Never prints the login password.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginZentao {
                base_url, account, ..
            } => f
                .debug_struct("LoginZentao")
                .field("base_url", base_url)
                .field("account", account)
                .finish_non_exhaustive(),
            Self::GetProductDetail { product_id } => f
                .debug_struct("GetProductDetail")
                .field("product_id", product_id)
                .finish(),
            Self::GetBugsByProduct { product_ids } => f
                .debug_struct("GetBugsByProduct")
                .field("product_ids", product_ids)
                .finish(),
            Self::GetBugDetail { bug_id } => {
                f.debug_struct("GetBugDetail").field("bug_id", bug_id).finish()
            }
            Self::GetImage { image_path } => f
                .debug_struct("GetImage")
                .field("image_path", image_path)
                .finish(),
            Self::SaveConfig { config } => {
                f.debug_struct("SaveConfig").field("config", config).finish()
            }
            other => f.write_str(other.name()),
        }
    }
}

/// A command ready to be delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub trace_context: Option<TraceContext>,
}

impl Invocation {
    /// Wraps a command, attaching the trace context of the current span.
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            command,
            trace_context: TraceContext::from_current(),
        }
    }
}
