use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::auth::{AuthBackend, AuthEvent, AuthSession, LoginCredentials, SignupCredentials};
use crate::error::{Error, Result};
use crate::models::{AuthUser, StoredUser};
use crate::validation;

// low cost: this backend exists for tests and local embedding
const BCRYPT_COST: u32 = 4;
const EVENT_CHANNEL_DEPTH: usize = 16;

/// In-memory auth backend with the same contract as `PgAuth`: opaque tokens
/// instead of JWTs, but the same events, the same single-principal session,
/// and the same error surface.
pub struct MemoryAuth {
    users: Mutex<Vec<StoredUser>>,
    session: Mutex<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_DEPTH);
        Self {
            users: Mutex::new(Vec::new()),
            session: Mutex::new(None),
            events,
        }
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackend for MemoryAuth {
    async fn sign_up(&self, credentials: &SignupCredentials) -> Result<AuthUser> {
        validation::validate_signup(credentials)?;
        let email = credentials.email.trim().to_lowercase();

        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == email) {
            return Err(Error::EmailTaken);
        }
        let user = StoredUser {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash: bcrypt::hash(&credentials.password, BCRYPT_COST)?,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }

    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<AuthSession> {
        validation::validate_login(credentials)?;
        let email = credentials.email.trim().to_lowercase();

        let users = self.users.lock().await;
        let stored = users
            .iter()
            .find(|u| u.email == email)
            .ok_or(Error::InvalidCredentials)?;
        if !bcrypt::verify(&credentials.password, &stored.password_hash)? {
            return Err(Error::InvalidCredentials);
        }

        let session = AuthSession {
            user: AuthUser {
                id: stored.id,
                email: stored.email.clone(),
            },
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Uuid::new_v4().to_string(),
        };
        *self.session.lock().await = Some(session.clone());
        let _ = self.events.send(AuthEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.session.lock().await.take();
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.session.lock().await.clone())
    }

    async fn refresh(&self) -> Result<AuthSession> {
        let mut session = self.session.lock().await;
        let live = session.as_mut().ok_or(Error::NotAuthenticated)?;
        live.access_token = Uuid::new_v4().to_string();
        let refreshed = live.clone();
        drop(session);
        let _ = self
            .events
            .send(AuthEvent::TokenRefreshed(refreshed.user.clone()));
        Ok(refreshed)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
