use std::sync::Arc;

use log::warn;
use tokio::sync::{broadcast, watch};

use crate::auth::{AuthBackend, AuthEvent};
use crate::error::Result;
use crate::models::AuthUser;

/// Where the process currently stands with the auth service. `Loading` and
/// `SignedOut` are deliberately distinct: a guard must not redirect while
/// the initial lookup is still in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Loading,
    SignedOut,
    SignedIn(AuthUser),
}

impl SessionStatus {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionStatus::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionStatus::Loading)
    }
}

/// Process-wide mirror of the backend's auth session. Only this type writes
/// the state; everything else reads it through `status`/`current_user` or a
/// `subscribe` receiver (dropping the receiver is the unsubscribe).
#[derive(Clone)]
pub struct SessionMirror {
    tx: Arc<watch::Sender<SessionStatus>>,
}

impl SessionMirror {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionStatus::Loading);
        Self { tx: Arc::new(tx) }
    }

    /// Resolve the initial `Loading` state from the backend's current
    /// session. A failed lookup still resolves (to `SignedOut`) so guards
    /// are never stuck deciding, and the failure is surfaced to the caller.
    pub async fn initialize(&self, auth: &dyn AuthBackend) -> Result<()> {
        match auth.current_session().await {
            Ok(Some(session)) => {
                self.tx.send_replace(SessionStatus::SignedIn(session.user));
                Ok(())
            }
            Ok(None) => {
                self.tx.send_replace(SessionStatus::SignedOut);
                Ok(())
            }
            Err(err) => {
                self.tx.send_replace(SessionStatus::SignedOut);
                Err(err)
            }
        }
    }

    /// Fold one session-change notification into the mirrored state.
    pub fn apply(&self, event: &AuthEvent) {
        let next = match event {
            AuthEvent::SignedIn(user) | AuthEvent::TokenRefreshed(user) => {
                SessionStatus::SignedIn(user.clone())
            }
            AuthEvent::SignedOut => SessionStatus::SignedOut,
        };
        self.tx.send_replace(next);
    }

    /// Drive the mirror from the backend's notification stream until the
    /// backend drops its sender.
    pub async fn listen(&self, mut events: broadcast::Receiver<AuthEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => self.apply(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("session mirror lagged behind {skipped} auth events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.tx.borrow().clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.tx.borrow().user().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.tx.subscribe()
    }
}

impl Default for SessionMirror {
    fn default() -> Self {
        Self::new()
    }
}
