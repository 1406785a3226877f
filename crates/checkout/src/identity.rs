//! Authenticated caller identity.

use common::UserId;
use serde::Serialize;

/// The signed-in shopper behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
}

impl Identity {
    /// Returns None unless both the user ID and the email are non-blank.
    pub fn new(user_id: &str, email: &str) -> Option<Self> {
        let user_id = UserId::new(user_id)?;
        let email = email.trim();
        if email.is_empty() {
            return None;
        }
        Some(Self {
            user_id,
            email: email.to_string(),
        })
    }
}
