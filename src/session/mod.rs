//! Session layer: failure classification and the shared session state.

pub mod classifier;
pub mod manager;

pub use classifier::{classify, FailureKind, TOKEN_EXPIRED, UNAUTHORIZED};
pub use manager::{SessionEpoch, SessionManager, SessionState};
