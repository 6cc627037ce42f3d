//! Binding value objects.

use std::borrow::Borrow;
use std::fmt;

use crate::error::BindingError;

/// Opaque integer identifying a Telegram conversation.
pub type ChatId = i64;

/// Lowercase and trim a raw GitHub login for case-insensitive matching.
///
/// Idempotent: `normalize_login(&normalize_login(s)) == normalize_login(s)`.
pub fn normalize_login(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A normalized, non-empty GitHub login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GithubLogin(String);

impl GithubLogin {
    /// Normalize `raw` and reject it if nothing is left.
    pub fn new(raw: &str) -> Result<Self, BindingError> {
        let login = normalize_login(raw);
        if login.is_empty() {
            return Err(BindingError::InvalidLogin);
        }
        Ok(Self(login))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GithubLogin {
    type Error = BindingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<GithubLogin> for String {
    fn from(login: GithubLogin) -> Self {
        login.0
    }
}

impl Borrow<str> for GithubLogin {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GithubLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Association between a chat and the GitHub login it wants notifications for.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserBinding {
    pub chat_id: ChatId,
    pub github_login: GithubLogin,
}

impl UserBinding {
    /// Build a binding from a raw login, normalizing it.
    ///
    /// Fails with [`BindingError::InvalidLogin`] when the trimmed login is empty.
    pub fn new(chat_id: ChatId, raw_login: &str) -> Result<Self, BindingError> {
        Ok(Self {
            chat_id,
            github_login: GithubLogin::new(raw_login)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let login = GithubLogin::new("  OctoCat\n").unwrap();
        assert_eq!(login.as_str(), "octocat");
    }

    #[test]
    fn empty_login_is_rejected() {
        assert!(matches!(GithubLogin::new(""), Err(BindingError::InvalidLogin)));
        assert!(matches!(GithubLogin::new(" \t "), Err(BindingError::InvalidLogin)));
    }

    #[test]
    fn binding_new_normalizes_login() {
        let binding = UserBinding::new(7, "Foo").unwrap();
        assert_eq!(binding.chat_id, 7);
        assert_eq!(binding.github_login.as_str(), "foo");
    }

    #[test]
    fn deserialize_rejects_blank_login() {
        let result: Result<UserBinding, _> =
            serde_json::from_str(r#"{"chat_id":1,"github_login":"   "}"#);
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_normalizes_login() {
        let binding: UserBinding =
            serde_json::from_str(r#"{"chat_id":1,"github_login":" Alice "}"#).unwrap();
        assert_eq!(binding.github_login.as_str(), "alice");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "\\PC{0,32}") {
            let once = normalize_login(&raw);
            prop_assert_eq!(normalize_login(&once), once);
        }

        #[test]
        fn mixed_case_padding_maps_to_same_login(
            login in "[a-zA-Z0-9-]{1,39}",
            left in "[ \t]{0,3}",
            right in "[ \t\n]{0,3}",
        ) {
            let padded = format!("{left}{}{right}", login.to_uppercase());
            prop_assert_eq!(
                GithubLogin::new(&padded).unwrap(),
                GithubLogin::new(&login).unwrap()
            );
        }
    }
}
