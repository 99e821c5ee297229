//! Session identity value type.

use std::fmt;
use thiserror::Error;

/// Errors returned while constructing or storing session identities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The phone identifier is empty after trimming.
    #[error("session phone must not be empty")]
    MissingPhone,

    /// The bearer token is empty after trimming.
    #[error("session token must not be empty")]
    MissingToken,

    /// The requested lifetime does not fit in the supported time range.
    #[error("session lifetime {0} is out of range")]
    TtlOutOfRange(chrono::TimeDelta),

    /// The store lock was poisoned by a panicking writer.
    #[error("session store is unavailable: {0}")]
    Unavailable(String),
}

/// Phone identifier plus bearer token of the signed-in user.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    phone: String,
    token: String,
}

impl SessionIdentity {
    /// Creates a validated identity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingPhone`] or
    /// [`SessionError::MissingToken`] when either part is blank.
    pub fn new(phone: impl Into<String>, token: impl Into<String>) -> Result<Self, SessionError> {
        let phone = phone.into().trim().to_owned();
        let token = token.into().trim().to_owned();
        if phone.is_empty() {
            return Err(SessionError::MissingPhone);
        }
        if token.is_empty() {
            return Err(SessionError::MissingToken);
        }
        Ok(Self { phone, token })
    }

    /// Returns the phone identifier.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Returns the bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the phone with all but the last two characters masked.
    #[must_use]
    pub fn masked_phone(&self) -> String {
        let count = self.phone.chars().count();
        self.phone
            .chars()
            .enumerate()
            .map(|(index, ch)| if index + 2 < count { '*' } else { ch })
            .collect()
    }
}

impl fmt::Debug for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIdentity")
            .field("phone", &self.masked_phone())
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionError, SessionIdentity};
    use rstest::rstest;

    #[rstest]
    #[case("", "token", SessionError::MissingPhone)]
    #[case("   ", "token", SessionError::MissingPhone)]
    #[case("0501234567", "", SessionError::MissingToken)]
    #[case("0501234567", "  ", SessionError::MissingToken)]
    fn blank_parts_are_rejected(
        #[case] phone: &str,
        #[case] token: &str,
        #[case] expected: SessionError,
    ) {
        assert_eq!(SessionIdentity::new(phone, token), Err(expected));
    }

    #[test]
    fn debug_output_hides_token_and_masks_phone() {
        let identity = SessionIdentity::new("0501234567", "secret-token").expect("valid identity");
        let rendered = format!("{identity:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("********67"));
    }
}
