//! Session-expiry classification of backend failures.

use crate::bridge::Failure;

/// Failure text the backend sends when the session token has expired.
pub const TOKEN_EXPIRED: &str = "Token expired";

/// Failure text the backend sends when the server rejects the token.
pub const UNAUTHORIZED: &str = "Unauthorized";

/// What a failed backend call means for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The user must log in again.
    SessionExpired,
    /// Any other failure, rendered for display.
    Other(String),
}

/// Classifies a failure.
///
/// Only a failure that is exactly one of the two sentinel strings counts as
/// a session failure. The match is case-sensitive with no trimming, so
/// `"token expired"` or `"Unauthorized "` are ordinary failures.
///
/// # Examples
///
/// ```
/// use zentao_desk::bridge::Failure;
/// use zentao_desk::session::{classify, FailureKind};
///
/// assert_eq!(classify(&Failure::from("Unauthorized")), FailureKind::SessionExpired);
/// assert_eq!(
///     classify(&Failure::from("network unreachable")),
///     FailureKind::Other("network unreachable".to_string())
/// );
/// ```
#[must_use]
pub fn classify(failure: &Failure) -> FailureKind {
    match failure.as_str() {
        Some(TOKEN_EXPIRED | UNAUTHORIZED) => FailureKind::SessionExpired,
        _ => FailureKind::Other(failure.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sentinels_are_session_failures() {
        assert_eq!(classify(&Failure::from(TOKEN_EXPIRED)), FailureKind::SessionExpired);
        assert_eq!(classify(&Failure::from(UNAUTHORIZED)), FailureKind::SessionExpired);
    }

    #[test]
    fn near_misses_are_other() {
        for text in ["token expired", "Unauthorized ", " Token expired", "Token expired!", "401 Unauthorized", ""] {
            assert_eq!(
                classify(&Failure::from(text)),
                FailureKind::Other(text.to_string()),
                "{text:?}"
            );
        }
    }

    #[test]
    fn non_string_failures_are_other() {
        let failure = Failure::new(json!({ "message": "Token expired" }));

        assert_eq!(
            classify(&failure),
            FailureKind::Other(r#"{"message":"Token expired"}"#.to_string())
        );
        assert!(matches!(classify(&Failure::new(json!(null))), FailureKind::Other(_)));
    }
}
