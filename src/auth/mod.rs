use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::models::AuthUser;

mod memory;
mod postgres;

pub use memory::MemoryAuth;
pub use postgres::PgAuth;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupCredentials {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: AuthUser,
    pub access_token: String,
    pub refresh_token: String,
}

/// Session-change notification, mirroring what the auth service tells its
/// clients: someone signed in, signed out, or had their token refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SignedOut,
    TokenRefreshed(AuthUser),
}

/// The hosted auth service as consumed by this crate. Implementations emit
/// an `AuthEvent` on every session change; the session mirror subscribes.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_up(&self, credentials: &SignupCredentials) -> Result<AuthUser>;
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<AuthSession>;
    async fn sign_out(&self) -> Result<()>;
    /// The live session held by this process, if any. An expired access
    /// token reads as no session; `refresh` mints a new one.
    async fn current_session(&self) -> Result<Option<AuthSession>>;
    async fn refresh(&self) -> Result<AuthSession>;
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
