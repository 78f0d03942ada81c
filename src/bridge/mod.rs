//! Command bridge: typed calls into the native backend.
//!
//! The bridge marshals each backend capability as a named [`Command`] with
//! explicit arguments, sends it over a [`Transport`], and hands back either
//! the decoded result or the backend's opaque [`Failure`].
//!
//! # Modules
//!
//! - `command`: command catalogue and trace context propagation
//! - `failure`: the opaque failure value
//! - `transport`: the [`Transport`] trait
//! - `client`: [`CommandBridge`], one typed method per command
//! - `process`: newline-delimited JSON with a backend child process
//! - `stub`: in-process backend for tests and the offline mode

pub mod client;
pub mod command;
pub mod failure;
pub mod process;
pub mod stub;
pub mod transport;

pub use client::CommandBridge;
pub use command::{Command, Invocation, TraceContext};
pub use failure::Failure;
pub use process::{Outcome, ProcessTransport, Reply, Request, BACKEND_CLOSED};
pub use stub::{StubBackend, StubFixture};
pub use transport::Transport;
