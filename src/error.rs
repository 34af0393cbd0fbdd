use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("snippet {0} not found")]
    SnippetNotFound(Uuid),

    /// The delete-then-insert tag replacement stopped partway. The snippet's
    /// association set no longer matches the prior or the intended tag list;
    /// callers must report this, not retry silently.
    #[error("tag sync interrupted for snippet {snippet_id}; associations may be incomplete")]
    TagSyncInterrupted {
        snippet_id: Uuid,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing failed")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("invalid value for environment variable {0}")]
    InvalidEnv(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
