//! Resource state containers for the client's views.
//!
//! Each container is a [`Resource`] wired to one bridge operation with its
//! own notification policy:
//!
//! | Container | Operation | On success | On failure |
//! |---|---|---|---|
//! | [`BugList`] | `get_bugs_by_product` | "Fetched N bugs", or "No bug data" | reported |
//! | [`ProductList`] | `get_products` | "Fetched N products" | reported |
//! | [`Profile`] | `get_user_info` | nothing | logged only |

pub mod notice;
pub mod resource;

pub use notice::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use resource::{FailurePolicy, Fetcher, Policy, Resource};

use crate::bridge::CommandBridge;
use crate::domain::{Bug, Product, UserInfo};
use crate::session::SessionManager;
use futures_util::FutureExt;
use std::sync::Arc;

/// Bugs of the selected products, fetched by product ids.
pub type BugList = Resource<Vec<u32>, Vec<Bug>>;

/// Products visible to the user.
pub type ProductList = Resource<(), Vec<Product>>;

/// The logged-in user's profile.
pub type Profile = Resource<(), Option<UserInfo>>;

#[allow(clippy::ptr_arg)]
fn announce_bugs(bugs: &Vec<Bug>) -> Option<Notice> {
    Some(if bugs.is_empty() {
        Notice::info("No bug data")
    } else {
        Notice::success(format!("Fetched {} bugs", bugs.len()))
    })
}

#[allow(clippy::ptr_arg)]
fn announce_products(products: &Vec<Product>) -> Option<Notice> {
    Some(Notice::success(format!("Fetched {} products", products.len())))
}

fn announce_nothing<V>(_: &V) -> Option<Notice> {
    None
}

#[must_use]
pub fn bug_list(bridge: &CommandBridge, session: &SessionManager, notifier: Arc<dyn Notifier>) -> BugList {
    let bridge = bridge.clone();
    Resource::new(
        "bugs",
        Box::new(move |product_ids: Vec<u32>| {
            let bridge = bridge.clone();
            async move { bridge.get_bugs_by_product(&product_ids).await }.boxed()
        }),
        Policy {
            announce: announce_bugs,
            on_failure: FailurePolicy::Report { subject: "bug list" },
        },
        session.clone(),
        notifier,
    )
}

#[must_use]
pub fn product_list(
    bridge: &CommandBridge,
    session: &SessionManager,
    notifier: Arc<dyn Notifier>,
) -> ProductList {
    let bridge = bridge.clone();
    Resource::new(
        "products",
        Box::new(move |()| {
            let bridge = bridge.clone();
            async move { bridge.get_products().await }.boxed()
        }),
        Policy {
            announce: announce_products,
            on_failure: FailurePolicy::Report {
                subject: "product list",
            },
        },
        session.clone(),
        notifier,
    )
}

#[must_use]
pub fn profile(bridge: &CommandBridge, session: &SessionManager, notifier: Arc<dyn Notifier>) -> Profile {
    let bridge = bridge.clone();
    Resource::new(
        "user_info",
        Box::new(move |()| {
            let bridge = bridge.clone();
            async move { bridge.get_user_info().await.map(Some) }.boxed()
        }),
        Policy {
            announce: announce_nothing,
            on_failure: FailurePolicy::Quiet,
        },
        session.clone(),
        notifier,
    )
}
