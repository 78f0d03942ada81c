//! Application layer coordinating the bridge, session and containers.
//!
//! ```text
//! caller ─► Desk ─► Resource (bugs │ products │ profile) ─► CommandBridge ─► Transport
//!            │             │
//!            └─► SessionManager ◄─ classify(Failure)
//! ```

pub mod desk;

pub use desk::Desk;
