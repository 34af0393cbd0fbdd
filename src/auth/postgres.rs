use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::auth::{AuthBackend, AuthEvent, AuthSession, LoginCredentials, SignupCredentials};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{AuthUser, Claims, SessionRecord, StoredUser};
use crate::validation;

const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
const REFRESH_TOKEN_TTL_HOURS: i64 = 24;
const BCRYPT_COST: u32 = 12;
const EVENT_CHANNEL_DEPTH: usize = 16;

#[derive(Clone)]
struct TokenPair {
    access: String,
    refresh: String,
}

/// Auth backend over the hosted store: bcrypt-hashed accounts, short-lived
/// JWT access tokens, refresh tokens tracked in revocable session rows.
/// Holds this process's token pair; one `PgAuth` mirrors one signed-in
/// principal at a time.
pub struct PgAuth {
    pool: PgPool,
    access_secret: String,
    refresh_secret: String,
    events: broadcast::Sender<AuthEvent>,
    tokens: Mutex<Option<TokenPair>>,
}

impl PgAuth {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_DEPTH);
        Self {
            pool,
            access_secret: config.jwt_access_secret.clone(),
            refresh_secret: config.jwt_refresh_secret.clone(),
            events,
            tokens: Mutex::new(None),
        }
    }

    fn issue_token(&self, user: &AuthUser, secret: &str, ttl: Duration) -> Result<String> {
        let claims = Claims {
            user: user.clone(),
            exp: (Utc::now() + ttl).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    fn decode_user(token: &str, secret: &str) -> Result<AuthUser> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims.user)
    }
}

#[async_trait]
impl AuthBackend for PgAuth {
    async fn sign_up(&self, credentials: &SignupCredentials) -> Result<AuthUser> {
        validation::validate_signup(credentials)?;
        let email = credentials.email.trim().to_lowercase();
        let password_hash = bcrypt::hash(&credentials.password, BCRYPT_COST)?;

        let inserted = sqlx::query_as::<_, StoredUser>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => Ok(AuthUser {
                id: user.id,
                email: user.email,
            }),
            Err(sqlx::Error::Database(db)) if db.message().contains("users_email_key") => {
                Err(Error::EmailTaken)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<AuthSession> {
        validation::validate_login(credentials)?;
        let email = credentials.email.trim().to_lowercase();

        let stored = sqlx::query_as::<_, StoredUser>(
            r#"
            SELECT id, email, password_hash, created_at
              FROM users
             WHERE email = $1
            "#,
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        // unknown email and wrong password read the same to the caller
        let stored = stored.ok_or(Error::InvalidCredentials)?;
        if !bcrypt::verify(&credentials.password, &stored.password_hash)? {
            return Err(Error::InvalidCredentials);
        }

        let user = AuthUser {
            id: stored.id,
            email: stored.email,
        };
        let access = self.issue_token(
            &user,
            &self.access_secret,
            Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
        )?;
        let refresh = self.issue_token(
            &user,
            &self.refresh_secret,
            Duration::hours(REFRESH_TOKEN_TTL_HOURS),
        )?;

        // rotate the live session row if one exists, insert otherwise
        let rotated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE user_sessions
               SET refresh_token = $1,
                   last_used_at  = NOW()
             WHERE user_id = $2
               AND revoked = FALSE
            RETURNING id
            "#,
        )
        .bind(&refresh)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await?;

        if rotated.is_none() {
            sqlx::query(
                r#"
                INSERT INTO user_sessions (user_id, refresh_token)
                VALUES ($1, $2)
                "#,
            )
            .bind(user.id)
            .bind(&refresh)
            .execute(&self.pool)
            .await?;
        }

        *self.tokens.lock().await = Some(TokenPair {
            access: access.clone(),
            refresh: refresh.clone(),
        });
        let _ = self.events.send(AuthEvent::SignedIn(user.clone()));

        Ok(AuthSession {
            user,
            access_token: access,
            refresh_token: refresh,
        })
    }

    async fn sign_out(&self) -> Result<()> {
        let pair = self.tokens.lock().await.take();
        if let Some(pair) = pair {
            if let Ok(user) = Self::decode_user(&pair.refresh, &self.refresh_secret) {
                sqlx::query(
                    r#"
                    UPDATE user_sessions
                       SET revoked = TRUE
                     WHERE user_id = $1
                       AND refresh_token = $2
                    "#,
                )
                .bind(user.id)
                .bind(&pair.refresh)
                .execute(&self.pool)
                .await?;
            }
        }
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        let tokens = self.tokens.lock().await;
        let Some(pair) = tokens.as_ref() else {
            return Ok(None);
        };
        match Self::decode_user(&pair.access, &self.access_secret) {
            Ok(user) => Ok(Some(AuthSession {
                user,
                access_token: pair.access.clone(),
                refresh_token: pair.refresh.clone(),
            })),
            // expired or malformed access token: no current session
            Err(_) => Ok(None),
        }
    }

    async fn refresh(&self) -> Result<AuthSession> {
        let mut tokens = self.tokens.lock().await;
        let pair = tokens.as_ref().ok_or(Error::NotAuthenticated)?;
        let user = Self::decode_user(&pair.refresh, &self.refresh_secret)?;

        let live = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT id, user_id, refresh_token, created_at, last_used_at, revoked
              FROM user_sessions
             WHERE user_id = $1
               AND refresh_token = $2
               AND revoked = FALSE
            "#,
        )
        .bind(user.id)
        .bind(&pair.refresh)
        .fetch_optional(&self.pool)
        .await?;
        if live.is_none() {
            return Err(Error::NotAuthenticated);
        }

        let access = self.issue_token(
            &user,
            &self.access_secret,
            Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
        )?;
        let refresh = pair.refresh.clone();
        *tokens = Some(TokenPair {
            access: access.clone(),
            refresh: refresh.clone(),
        });

        sqlx::query(
            r#"
            UPDATE user_sessions
               SET last_used_at = NOW()
             WHERE user_id = $1
               AND refresh_token = $2
            "#,
        )
        .bind(user.id)
        .bind(&refresh)
        .execute(&self.pool)
        .await?;

        let _ = self.events.send(AuthEvent::TokenRefreshed(user.clone()));
        Ok(AuthSession {
            user,
            access_token: access,
            refresh_token: refresh,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
