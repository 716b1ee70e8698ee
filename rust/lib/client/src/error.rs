use gema_core::{ResolveError, ValidationErrors};

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session token; raised before any request is sent.
    #[error("No se encontró el token de autenticación")]
    MissingSession,

    /// Non-2xx response. `message` is the body's `error` field, or the
    /// operation's fallback text when the body has none.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ApiError {
    /// HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error was raised locally, before reaching the backend.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            ApiError::MissingSession | ApiError::Validation(_) | ApiError::Resolve(_)
        )
    }
}
