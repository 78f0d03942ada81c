//! Typed command bridge over a [`Transport`].

use super::command::{Command, Invocation};
use super::failure::Failure;
use super::transport::Transport;
use crate::domain::{Bug, LoginConfig, Product, UserInfo};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::Instrument;

/// The call-and-response interface to the native backend.
///
/// One method per backend capability, each taking explicit named arguments
/// and returning the decoded result or the backend's opaque [`Failure`]. The
/// bridge is a pure marshaling layer: a single round trip per call, no
/// retries, no caching. Cloning is cheap and shares the transport.
#[derive(Clone)]
pub struct CommandBridge {
    transport: Arc<dyn Transport>,
}

impl CommandBridge {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Sends a command and decodes its result.
    ///
    /// A result that does not match the expected shape becomes a string
    /// failure naming the command.
    async fn call<R: DeserializeOwned>(&self, command: Command) -> Result<R, Failure> {
        let name = command.name();
        let span = tracing::debug_span!("bridge_call", command = name);
        let invocation = span.in_scope(|| Invocation::new(command));

        let value = self
            .transport
            .invoke(invocation)
            .instrument(span.clone())
            .await
            .map_err(|failure| {
                tracing::debug!(parent: &span, failure = %failure, "command failed");
                failure
            })?;

        serde_json::from_value(value).map_err(|e| {
            tracing::debug!(parent: &span, error = %e, "command result did not decode");
            Failure::message(format!("invalid {name} result: {e}"))
        })
    }

    /// Asks the backend to load its persisted state.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn initialize_app(&self) -> Result<bool, Failure> {
        self.call(Command::InitializeApp).await
    }

    /// Logs in; returns whether the server accepted the credentials.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn login(&self, base_url: &str, account: &str, password: &str) -> Result<bool, Failure> {
        self.call(Command::LoginZentao {
            base_url: base_url.to_string(),
            account: account.to_string(),
            password: password.to_string(),
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn logout(&self) -> Result<(), Failure> {
        self.call(Command::LogoutZentao).await
    }

    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn check_login_status(&self) -> Result<bool, Failure> {
        self.call(Command::CheckLoginStatus).await
    }

    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn get_user_info(&self) -> Result<UserInfo, Failure> {
        self.call(Command::GetUserInfo).await
    }

    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn get_products(&self) -> Result<Vec<Product>, Failure> {
        self.call(Command::GetProducts).await
    }

    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn get_product_detail(&self, product_id: u32) -> Result<Product, Failure> {
        self.call(Command::GetProductDetail { product_id }).await
    }

    /// Fetches the bugs of all given products in one round trip.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn get_bugs_by_product(&self, product_ids: &[u32]) -> Result<Vec<Bug>, Failure> {
        self.call(Command::GetBugsByProduct {
            product_ids: product_ids.to_vec(),
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn get_bug_detail(&self, bug_id: u32) -> Result<Bug, Failure> {
        self.call(Command::GetBugDetail { bug_id }).await
    }

    /// Fetches an image referenced from bug steps.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn get_image(&self, image_path: &str) -> Result<String, Failure> {
        self.call(Command::GetImage {
            image_path: image_path.to_string(),
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn save_config(&self, config: &LoginConfig) -> Result<(), Failure> {
        self.call(Command::SaveConfig {
            config: config.clone(),
        })
        .await
    }

    /// Returns the saved login configuration, if any.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure value.
    pub async fn load_config(&self) -> Result<Option<LoginConfig>, Failure> {
        self.call(Command::LoadConfig).await
    }
}

impl std::fmt::Debug for CommandBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBridge").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Replies with a fixed value and records what it was asked.
    struct Canned {
        reply: Result<Value, Failure>,
        seen: Mutex<Vec<Command>>,
    }

    impl Canned {
        fn new(reply: Result<Value, Failure>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn invoke(&self, invocation: Invocation) -> Result<Value, Failure> {
            self.seen.lock().unwrap().push(invocation.command);
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn passes_arguments_through() {
        let transport = Canned::new(Ok(json!([])));
        let bridge = CommandBridge::new(transport.clone());

        let bugs = bridge.get_bugs_by_product(&[4, 2]).await.unwrap();

        assert!(bugs.is_empty());
        assert_eq!(
            transport.seen.lock().unwrap().as_slice(),
            &[Command::GetBugsByProduct {
                product_ids: vec![4, 2]
            }]
        );
    }

    #[tokio::test]
    async fn backend_failure_is_returned_untouched() {
        let failure = Failure::new(json!({ "reason": "maintenance" }));
        let bridge = CommandBridge::new(Canned::new(Err(failure.clone())));

        assert_eq!(bridge.get_products().await.unwrap_err(), failure);
    }

    #[tokio::test]
    async fn mismatched_result_becomes_failure() {
        let bridge = CommandBridge::new(Canned::new(Ok(json!("not a list"))));

        let failure = bridge.get_products().await.unwrap_err();

        assert!(failure.to_string().starts_with("invalid get_products result"));
    }

    #[tokio::test]
    async fn null_config_is_absent() {
        let bridge = CommandBridge::new(Canned::new(Ok(Value::Null)));

        assert_eq!(bridge.load_config().await.unwrap(), None);
        bridge.logout().await.unwrap();
    }
}
