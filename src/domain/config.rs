//! The durable login configuration.

use serde::{Deserialize, Serialize};

/// Login configuration persisted by the backend between runs.
///
/// The backend stores it opaquely; the client only saves it after a
/// successful login and loads it to prefill the login form. The password is
/// never shown by the `Debug` implementation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginConfig {
    /// Base URL of the ZenTao server, e.g. `https://zentao.example.com`.
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    pub account: String,
    pub password: String,
}

impl LoginConfig {
    pub fn new(
        base_url: impl Into<String>,
        account: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            account: account.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginConfig")
            .field("base_url", &self.base_url)
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .finish()
    }
}
