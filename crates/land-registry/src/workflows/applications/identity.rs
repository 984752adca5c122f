use super::domain::UserId;

/// Error raised while resolving a bearer credential.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("missing or invalid credential")]
    Unauthenticated,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a bearer credential to a user account. Officer capability is a
/// separate repository lookup keyed by the resolved user id.
pub trait IdentityProvider: Send + Sync {
    fn resolve_bearer(&self, token: &str) -> Result<UserId, IdentityError>;
}
