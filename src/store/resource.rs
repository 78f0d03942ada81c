//! Generic resource state container.
//!
//! A [`Resource`] owns one value fetched from the backend and a busy flag. It
//! runs the fetch through the command bridge, replaces the value on success,
//! and turns failures into notices or a [`LoginRequired`] signal according to
//! its [`Policy`]. The three containers of the client (bugs, products, user
//! info) are instances of this type that differ only in fetcher and policy.
//!
//! # Overlapping fetches
//!
//! Every fetch takes a generation ticket when it starts. Only the most
//! recently started fetch may store its result; an older fetch that finishes
//! later is discarded. The busy flag counts fetches in flight and stays set
//! until all of them have finished.

use super::notice::{Notice, Notifier};
use crate::bridge::Failure;
use crate::domain::LoginRequired;
use crate::session::{FailureKind, SessionManager};
use futures_util::future::BoxFuture;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::Instrument;

/// Runs one backend call for a fetch.
pub type Fetcher<A, V> = Box<dyn Fn(A) -> BoxFuture<'static, Result<V, Failure>> + Send + Sync>;

/// How a container treats a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Classify the failure. Session failures raise [`LoginRequired`]; others
    /// become an error notice "Failed to fetch {subject}: {message}".
    Report { subject: &'static str },
    /// Log the failure and carry on. Nothing is classified or shown.
    Quiet,
}

/// Notification behavior of a container.
pub struct Policy<V> {
    /// Builds the success notice for a freshly fetched value, if any.
    pub announce: fn(&V) -> Option<Notice>,
    pub on_failure: FailurePolicy,
}

impl<V> Clone for Policy<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Policy<V> {}

impl<V> std::fmt::Debug for Policy<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policy")
            .field("on_failure", &self.on_failure)
            .finish_non_exhaustive()
    }
}

struct Slot<V> {
    value: V,
    in_flight: usize,
    generation: u64,
}

fn lock<V>(slot: &Mutex<Slot<V>>) -> MutexGuard<'_, Slot<V>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks one fetch in flight. Dropping it clears the mark on every exit
/// path, including cancellation of the fetch future.
struct Ticket<'a, V> {
    slot: &'a Mutex<Slot<V>>,
    generation: u64,
}

impl<'a, V> Ticket<'a, V> {
    fn issue(slot: &'a Mutex<Slot<V>>) -> Self {
        let mut guard = lock(slot);
        guard.generation = guard.generation.wrapping_add(1);
        guard.in_flight += 1;
        Self {
            slot,
            generation: guard.generation,
        }
    }

    /// Stores `value` unless a newer fetch or a reset happened meanwhile.
    fn settle(&self, value: V) -> bool {
        let mut guard = lock(self.slot);
        if guard.generation != self.generation {
            return false;
        }
        guard.value = value;
        true
    }
}

impl<V> Drop for Ticket<'_, V> {
    fn drop(&mut self) {
        let mut guard = lock(self.slot);
        guard.in_flight = guard.in_flight.saturating_sub(1);
    }
}

/// A fetched value with its busy state.
///
/// `A` is the fetch argument (`()` for argument-less resources) and `V` the
/// held value, starting at `V::default()`.
pub struct Resource<A, V> {
    label: &'static str,
    fetcher: Fetcher<A, V>,
    policy: Policy<V>,
    slot: Mutex<Slot<V>>,
    session: SessionManager,
    notifier: Arc<dyn Notifier>,
}

impl<A, V> Resource<A, V>
where
    A: Send,
    V: Default + Clone + Send,
{
    pub fn new(
        label: &'static str,
        fetcher: Fetcher<A, V>,
        policy: Policy<V>,
        session: SessionManager,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            label,
            fetcher,
            policy,
            slot: Mutex::new(Slot {
                value: V::default(),
                in_flight: 0,
                generation: 0,
            }),
            session,
            notifier,
        }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn value(&self) -> V {
        lock(&self.slot).value.clone()
    }

    /// Reads the current value without cloning it.
    pub fn with_value<R>(&self, read: impl FnOnce(&V) -> R) -> R {
        read(&lock(&self.slot).value)
    }

    /// True while at least one fetch is waiting on the backend.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        lock(&self.slot).in_flight
    }

    /// Clears the value. Fetches already in flight will not store theirs.
    pub fn reset(&self) {
        let mut guard = lock(&self.slot);
        guard.value = V::default();
        guard.generation = guard.generation.wrapping_add(1);
        tracing::debug!(resource = self.label, "resource reset");
    }

    /// Fetches a fresh value.
    ///
    /// Backend failures other than session failures are absorbed: the value
    /// is kept, an error notice may be emitted, and the fetch completes
    /// normally. While the session is known to be expired no call is made.
    ///
    /// # Errors
    ///
    /// Returns [`LoginRequired`] when a reporting resource meets a session
    /// failure, or is fetched while the session is expired. The held value
    /// is left untouched.
    pub async fn fetch(&self, args: A) -> Result<(), LoginRequired> {
        let span = tracing::debug_span!("resource_fetch", resource = self.label);
        self.run(args).instrument(span).await
    }

    async fn run(&self, args: A) -> Result<(), LoginRequired> {
        let epoch = self.session.epoch();
        if self.session.is_expired() {
            return match self.policy.on_failure {
                FailurePolicy::Report { .. } => {
                    tracing::debug!("session expired, login required");
                    Err(LoginRequired)
                }
                FailurePolicy::Quiet => {
                    tracing::debug!("session expired, skipping fetch");
                    Ok(())
                }
            };
        }

        let ticket = Ticket::issue(&self.slot);
        let outcome = (self.fetcher)(args).await;

        match outcome {
            Ok(value) => {
                let notice = (self.policy.announce)(&value);
                if ticket.settle(value) {
                    tracing::debug!("fetch stored");
                    self.session.confirm(epoch);
                    if let Some(notice) = notice {
                        self.notifier.notify(notice);
                    }
                } else {
                    tracing::debug!(generation = ticket.generation, "discarding stale fetch result");
                }
                Ok(())
            }
            Err(failure) => self.absorb(&failure),
        }
    }

    fn absorb(&self, failure: &Failure) -> Result<(), LoginRequired> {
        match self.policy.on_failure {
            FailurePolicy::Quiet => {
                tracing::warn!(resource = self.label, failure = %failure, "fetch failed");
                Ok(())
            }
            FailurePolicy::Report { subject } => match self.session.observe(failure) {
                FailureKind::SessionExpired => {
                    tracing::warn!(resource = self.label, "session expired during fetch");
                    Err(LoginRequired)
                }
                FailureKind::Other(message) => {
                    tracing::warn!(resource = self.label, failure = %message, "fetch failed");
                    self.notifier
                        .notify(Notice::error(format!("Failed to fetch {subject}: {message}")));
                    Ok(())
                }
            },
        }
    }
}

impl<V> Resource<(), V>
where
    V: Default + Clone + Send,
{
    /// Fetches a resource that takes no arguments.
    ///
    /// # Errors
    ///
    /// See [`Resource::fetch`].
    pub async fn refresh(&self) -> Result<(), LoginRequired> {
        self.fetch(()).await
    }
}

impl<A, V> std::fmt::Debug for Resource<A, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = lock(&self.slot);
        f.debug_struct("Resource")
            .field("label", &self.label)
            .field("in_flight", &guard.in_flight)
            .field("generation", &guard.generation)
            .finish_non_exhaustive()
    }
}
