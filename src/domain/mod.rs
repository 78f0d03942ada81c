//! Domain layer: the entities exchanged with the native backend.
//!
//! These are plain data shapes. They carry the backend's camelCase field
//! names on the wire, are replaced wholesale when refetched, and are never
//! validated client-side.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`user`]: `User` references and the session's `UserInfo`
//! - [`product`]: `Product` and its classification enums
//! - [`bug`]: `Bug` and `BugStatus`
//! - [`config`]: the durable `LoginConfig`
//! - [`time`]: display formatting for raw backend timestamps

pub mod bug;
pub mod config;
pub mod error;
pub mod product;
pub mod time;
pub mod user;

pub use bug::{Bug, BugStatus};
pub use config::LoginConfig;
pub use error::{DeskError, LoginRequired, Result};
pub use product::{Acl, Product, ProductType};
pub use user::{User, UserInfo};
