//! The application facade.
//!
//! [`Desk`] wires one command bridge, one session and one notifier into the
//! three resource containers, and carries the flows that sit outside the
//! containers: startup, login, logout and one-shot detail lookups.

use crate::bridge::{CommandBridge, Failure, Transport};
use crate::domain::error::{DeskError, Result};
use crate::domain::{Bug, LoginConfig, LoginRequired, Product};
use crate::session::{FailureKind, SessionEpoch, SessionManager};
use crate::store::{self, BugList, Notice, Notifier, ProductList, Profile};
use std::sync::Arc;

/// Session-aware entry point of the client.
pub struct Desk {
    bridge: CommandBridge,
    session: SessionManager,
    notifier: Arc<dyn Notifier>,
    bugs: BugList,
    products: ProductList,
    profile: Profile,
}

impl Desk {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        let bridge = CommandBridge::new(transport);
        let session = SessionManager::new();
        Self {
            bugs: store::bug_list(&bridge, &session, notifier.clone()),
            products: store::product_list(&bridge, &session, notifier.clone()),
            profile: store::profile(&bridge, &session, notifier.clone()),
            bridge,
            session,
            notifier,
        }
    }

    #[must_use]
    pub fn bridge(&self) -> &CommandBridge {
        &self.bridge
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    #[must_use]
    pub fn bugs(&self) -> &BugList {
        &self.bugs
    }

    #[must_use]
    pub fn products(&self) -> &ProductList {
        &self.products
    }

    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Prepares the backend and learns whether a session is still valid.
    ///
    /// Returns the remembered login configuration, if any, so a login form
    /// can be prefilled.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Backend`] when the backend fails to initialize or
    /// to load the configuration.
    pub async fn bootstrap(&self) -> Result<Option<LoginConfig>> {
        let restored = self.bridge.initialize_app().await.map_err(DeskError::Backend)?;
        tracing::debug!(restored = restored, "backend initialized");

        match self.bridge.check_login_status().await {
            Ok(true) => self.session.mark_authenticated(),
            Ok(false) => self.session.mark_expired(),
            Err(failure) => {
                let kind = self.session.observe(&failure);
                tracing::warn!(failure = %failure, kind = ?kind, "login status check failed");
            }
        }

        let config = self.bridge.load_config().await.map_err(DeskError::Backend)?;
        tracing::info!(
            session = ?self.session.state(),
            remembered = config.is_some(),
            "bootstrap complete"
        );
        Ok(config)
    }

    /// Logs in with `config`. When `remember` is set and the login succeeds
    /// the configuration is saved for the next start; a failed save is only
    /// reported.
    ///
    /// Returns whether the server accepted the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Backend`] when the login call itself fails.
    pub async fn login(&self, config: &LoginConfig, remember: bool) -> Result<bool> {
        let accepted = self
            .bridge
            .login(&config.base_url, &config.account, &config.password)
            .await
            .map_err(DeskError::Backend)?;

        if !accepted {
            tracing::info!(account = %config.account, "login rejected");
            self.session.mark_expired();
            return Ok(false);
        }

        tracing::info!(account = %config.account, "logged in");
        self.session.mark_authenticated();

        if remember {
            if let Err(failure) = self.bridge.save_config(config).await {
                tracing::warn!(failure = %failure, "failed to save login config");
                self.notifier
                    .notify(Notice::error(format!("Failed to save login config: {failure}")));
            }
        }

        Ok(true)
    }

    /// Ends the session and clears every container.
    ///
    /// The local session is ended even when the backend call fails.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Backend`] when the backend logout fails.
    pub async fn logout(&self) -> Result<()> {
        let outcome = self.bridge.logout().await;

        self.session.mark_expired();
        self.bugs.reset();
        self.products.reset();
        self.profile.reset();
        tracing::info!("logged out");

        outcome.map_err(DeskError::Backend)
    }

    /// # Errors
    ///
    /// Returns [`DeskError::LoginRequired`] on a session failure and
    /// [`DeskError::Backend`] on any other failure.
    pub async fn bug_detail(&self, bug_id: u32) -> Result<Bug> {
        let epoch = self.session.epoch();
        self.ensure_session()?;
        let outcome = self.bridge.get_bug_detail(bug_id).await;
        self.settle(epoch, outcome)
    }

    /// # Errors
    ///
    /// Returns [`DeskError::LoginRequired`] on a session failure and
    /// [`DeskError::Backend`] on any other failure.
    pub async fn product_detail(&self, product_id: u32) -> Result<Product> {
        let epoch = self.session.epoch();
        self.ensure_session()?;
        let outcome = self.bridge.get_product_detail(product_id).await;
        self.settle(epoch, outcome)
    }

    /// Fetches an image referenced from bug steps, as the backend encodes it.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::LoginRequired`] on a session failure and
    /// [`DeskError::Backend`] on any other failure.
    pub async fn image(&self, image_path: &str) -> Result<String> {
        let epoch = self.session.epoch();
        self.ensure_session()?;
        let outcome = self.bridge.get_image(image_path).await;
        self.settle(epoch, outcome)
    }

    fn ensure_session(&self) -> std::result::Result<(), LoginRequired> {
        if self.session.is_expired() {
            return Err(LoginRequired);
        }
        Ok(())
    }

    fn settle<T>(&self, epoch: SessionEpoch, outcome: std::result::Result<T, Failure>) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.session.confirm(epoch);
                Ok(value)
            }
            Err(failure) => match self.session.observe(&failure) {
                FailureKind::SessionExpired => Err(LoginRequired.into()),
                FailureKind::Other(_) => Err(DeskError::Backend(failure)),
            },
        }
    }
}

impl std::fmt::Debug for Desk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desk")
            .field("session", &self.session.state())
            .field("bugs", &self.bugs)
            .field("products", &self.products)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}
