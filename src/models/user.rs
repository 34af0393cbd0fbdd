use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ______________________________________ Principal ______________________________________

/// The authenticated principal as the rest of the crate sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Account row held by the auth backend; never leaves the auth module.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// ______________________________________ Sessions ______________________________________
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub revoked: bool,
}

// ______________________________________ Token claims ______________________________________
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user: AuthUser,
    pub exp: usize,
}
