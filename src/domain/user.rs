//! User references and the logged-in user's profile.

use serde::{Deserialize, Serialize};

/// A user referenced by another entity (bug actor, product role, creator).
///
/// Users are back-references only: the referencing entity does not own them
/// and the client never fetches them on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub account: String,
    /// Avatar reference as sent by the backend (path or URL, may be empty).
    #[serde(default)]
    pub avatar: String,
    /// Display name.
    pub realname: String,
}

impl User {
    /// Returns the name to show for this user, falling back to the account
    /// when the backend sent no real name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.realname.is_empty() {
            &self.account
        } else {
            &self.realname
        }
    }
}

/// Profile of the logged-in user.
///
/// Exactly one per session. Fetched on demand and discarded on logout, so a
/// new login cycle never shows the previous user's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: u32,
    /// Account kind, `inside` or `outside`.
    #[serde(rename = "type", alias = "user_type")]
    pub user_type: String,
    pub dept: u32,
    pub account: String,
    pub realname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    /// `f` or `m` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weixin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,
    #[serde(default)]
    pub admin: bool,
}

impl UserInfo {
    /// Returns the nickname when one is set, otherwise the real name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.realname)
    }

    /// Whether the account belongs to the organization (`inside`).
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.user_type == "inside"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_info_accepts_backend_type_key() {
        let info: UserInfo = serde_json::from_value(serde_json::json!({
            "id": 7,
            "type": "inside",
            "dept": 2,
            "account": "lina",
            "realname": "Li Na",
            "admin": true
        }))
        .unwrap();

        assert!(info.is_internal());
        assert!(info.admin);
        assert_eq!(info.display_name(), "Li Na");
        assert!(info.nickname.is_none());
    }

    #[test]
    fn nickname_wins_over_realname() {
        let info: UserInfo = serde_json::from_value(serde_json::json!({
            "id": 1,
            "user_type": "outside",
            "dept": 0,
            "account": "wb",
            "realname": "Wang Bo",
            "nickname": "bobo",
            "admin": false
        }))
        .unwrap();

        assert_eq!(info.display_name(), "bobo");
        assert!(!info.is_internal());
    }

    #[test]
    fn user_without_realname_shows_account() {
        let user = User {
            id: 3,
            account: "qa01".to_string(),
            avatar: String::new(),
            realname: String::new(),
        };
        assert_eq!(user.display_name(), "qa01");
    }
}
