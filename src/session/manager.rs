//! Explicit session state shared by the containers and the facade.

use super::classifier::{classify, FailureKind};
use crate::bridge::Failure;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// What the client currently believes about the backend session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing has been learned yet.
    #[default]
    Unknown,
    Authenticated,
    /// The backend rejected the session; a new login is required.
    Expired,
}

/// Marks the session a backend call was issued in.
///
/// Every expiry starts a new epoch, so a reply to a call issued before a
/// logout cannot authenticate the session again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEpoch(u64);

#[derive(Debug)]
struct Shared {
    state: watch::Sender<SessionState>,
    /// Only changed while the watch value is locked.
    epoch: AtomicU64,
}

/// Shared, observable session state.
///
/// Clones share one state. Subscribers are woken on every transition, which
/// is how a UI learns that it has to show the login screen.
#[derive(Debug, Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            shared: Arc::new(Shared {
                state,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.shared.state.borrow()
    }

    /// Returns a receiver that observes every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state() == SessionState::Expired
    }

    /// The current epoch. Capture it before a backend call and hand it to
    /// [`SessionManager::confirm`] when the call succeeds.
    #[must_use]
    pub fn epoch(&self) -> SessionEpoch {
        SessionEpoch(self.shared.epoch.load(Ordering::Acquire))
    }

    /// Marks the session authenticated, as after an accepted login.
    pub fn mark_authenticated(&self) {
        self.shared
            .state
            .send_if_modified(|current| Self::apply(current, SessionState::Authenticated));
    }

    /// Marks the session authenticated on behalf of a call that succeeded,
    /// unless the session expired since `epoch` was taken.
    ///
    /// Returns whether the session was confirmed.
    pub fn confirm(&self, epoch: SessionEpoch) -> bool {
        let mut confirmed = false;
        self.shared.state.send_if_modified(|current| {
            if self.shared.epoch.load(Ordering::Acquire) != epoch.0 {
                tracing::debug!(epoch = epoch.0, "ignoring success from an ended session");
                return false;
            }
            confirmed = true;
            Self::apply(current, SessionState::Authenticated)
        });
        confirmed
    }

    /// Marks the session expired and starts a new epoch.
    pub fn mark_expired(&self) {
        self.shared.state.send_if_modified(|current| {
            self.shared.epoch.fetch_add(1, Ordering::AcqRel);
            Self::apply(current, SessionState::Expired)
        });
    }

    /// Classifies a failure and marks the session expired when it is a
    /// session failure.
    pub fn observe(&self, failure: &Failure) -> FailureKind {
        let kind = classify(failure);
        if kind == FailureKind::SessionExpired {
            self.mark_expired();
        }
        kind
    }

    fn apply(current: &mut SessionState, next: SessionState) -> bool {
        if *current == next {
            return false;
        }
        tracing::debug!(from = ?*current, to = ?next, "session state changed");
        *current = next;
        true
    }
}
