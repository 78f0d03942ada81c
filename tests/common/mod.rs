#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify, Semaphore};
use zentao_desk::bridge::{Invocation, StubBackend, Transport};
use zentao_desk::store::ChannelNotifier;
use zentao_desk::{Bug, Desk, Failure, LoginConfig, Notice, Product, UserInfo};

pub fn bug(id: u32, product: u32, title: &str) -> Bug {
    serde_json::from_value(json!({
        "id": id,
        "product": product,
        "title": title,
        "severity": 3,
        "pri": 2,
        "type": "codeerror",
        "openedBy": { "id": 1, "account": "admin", "realname": "Admin" },
        "openedDate": "2024-05-01T02:03:04Z",
        "status": "active"
    }))
    .unwrap()
}

pub fn product(id: u32, name: &str) -> Product {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "code": name.to_lowercase(),
        "type": "normal",
        "acl": "open",
        "createdDate": "2024-01-01T00:00:00Z"
    }))
    .unwrap()
}

pub fn user() -> UserInfo {
    serde_json::from_value(json!({
        "id": 1,
        "type": "inside",
        "dept": 2,
        "account": "admin",
        "realname": "Admin",
        "admin": true
    }))
    .unwrap()
}

pub fn login() -> LoginConfig {
    LoginConfig::new("http://zentao.local", "admin", "123456")
}

/// A backend with two products, three bugs and a profile.
pub fn seeded() -> StubBackend {
    StubBackend::new()
        .with_user(user())
        .with_products(vec![product(1, "Desk"), product(2, "Server")])
        .with_bugs(vec![
            bug(11, 1, "Crash on start"),
            bug(12, 2, "Slow query"),
            bug(13, 1, "Typo in menu"),
        ])
}

pub fn desk_on(transport: Arc<dyn Transport>) -> (Desk, mpsc::UnboundedReceiver<Notice>) {
    let (notifier, notices) = ChannelNotifier::new();
    (Desk::new(transport, Arc::new(notifier)), notices)
}

pub fn drain(notices: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut seen = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        seen.push(notice);
    }
    seen
}

/// Holds every call until a permit is released.
pub struct Gated {
    inner: Arc<dyn Transport>,
    pub permits: Semaphore,
}

impl Gated {
    pub fn new(inner: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            permits: Semaphore::new(0),
        })
    }
}

#[async_trait]
impl Transport for Gated {
    async fn invoke(&self, invocation: Invocation) -> Result<Value, Failure> {
        self.permits.acquire().await.unwrap().forget();
        self.inner.invoke(invocation).await
    }
}

/// Answers every call at once but holds the replies to one command until a
/// permit is released, as a slow network would.
pub struct HeldReplies {
    inner: Arc<dyn Transport>,
    command: &'static str,
    /// Signalled once a held reply is ready.
    pub reached: Notify,
    pub permits: Semaphore,
}

impl HeldReplies {
    pub fn new(inner: Arc<dyn Transport>, command: &'static str) -> Arc<Self> {
        Arc::new(Self {
            inner,
            command,
            reached: Notify::new(),
            permits: Semaphore::new(0),
        })
    }
}

#[async_trait]
impl Transport for HeldReplies {
    async fn invoke(&self, invocation: Invocation) -> Result<Value, Failure> {
        let held = invocation.command.name() == self.command;
        let reply = self.inner.invoke(invocation).await;
        if held {
            self.reached.notify_one();
            self.permits.acquire().await.unwrap().forget();
        }
        reply
    }
}
