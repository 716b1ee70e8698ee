use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Pluggable token provider, asked before every authenticated request.
///
/// Returns `Ok(None)` when there is no token; authenticated endpoints then
/// fail with [`ApiError::MissingSession`] without sending anything.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

/// No authentication: only the login and static endpoints work.
pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// A logged-in user: bearer token plus the display name and email shown
/// in the shell. Created on login, dropped on logout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub email: String,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            email: email.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_empty()
    }
}

#[async_trait::async_trait]
impl TokenSource for Session {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        if self.is_active() {
            Ok(Some(self.token.clone()))
        } else {
            Ok(None)
        }
    }
}
