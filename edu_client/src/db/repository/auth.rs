//! Users, credentials and session tokens.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{RegisterRequest, User, UserId, UserRole};

/// Repository trait for accounts and bearer tokens.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Create an account. Emails are unique (case-insensitive).
    async fn create_user(&self, request: RegisterRequest) -> RepositoryResult<User>;

    /// Look a user up by email and password.
    ///
    /// # Returns
    /// * `Err(RepositoryError::Unauthorized)` - Unknown email or wrong password
    async fn verify_credentials(&self, email: &str, password: &str) -> RepositoryResult<User>;

    async fn get_user(&self, id: &UserId) -> RepositoryResult<User>;

    /// List users, optionally restricted to one role.
    async fn list_users(&self, role: Option<UserRole>) -> RepositoryResult<Vec<User>>;

    /// Issue a fresh bearer token for a user.
    async fn issue_token(&self, user_id: &UserId) -> RepositoryResult<String>;

    /// Resolve a bearer token to its user.
    ///
    /// # Returns
    /// * `Err(RepositoryError::Unauthorized)` - Unknown or revoked token
    async fn resolve_token(&self, token: &str) -> RepositoryResult<User>;

    /// Revoke a token. Revoking an unknown token is a no-op.
    async fn revoke_token(&self, token: &str) -> RepositoryResult<()>;

    /// Create a one-shot password reset token.
    ///
    /// Returns `None` for unknown emails so callers can answer uniformly.
    async fn create_reset_token(&self, email: &str) -> RepositoryResult<Option<String>>;

    /// Consume a reset token and set a new password.
    async fn reset_password(&self, reset_token: &str, password: &str) -> RepositoryResult<()>;
}
