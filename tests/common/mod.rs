#![allow(dead_code)]

use std::sync::Arc;

use snipvault::auth::{LoginCredentials, MemoryAuth, SignupCredentials};
use snipvault::models::SnippetDraft;
use snipvault::store::MemoryStore;
use snipvault::Client;

pub const EMAIL: &str = "dev@example.com";
pub const PASSWORD: &str = "Sup3rSecret";

pub struct TestHarness {
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub auth: Arc<MemoryAuth>,
}

impl TestHarness {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(MemoryAuth::new());
        let client = Client::new(store.clone(), auth.clone());
        Self {
            client,
            store,
            auth,
        }
    }

    /// Harness with an account registered and signed in, mirror resolved.
    pub async fn signed_in() -> Self {
        let harness = Self::new();
        harness
            .client
            .sign_up(&signup(EMAIL))
            .await
            .expect("sign up");
        harness
            .client
            .sign_in(&login(EMAIL))
            .await
            .expect("sign in");
        harness
    }
}

pub fn signup(email: &str) -> SignupCredentials {
    SignupCredentials {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
    }
}

pub fn login(email: &str) -> LoginCredentials {
    LoginCredentials {
        email: email.to_string(),
        password: PASSWORD.to_string(),
    }
}

pub fn draft(title: &str, language: &str, tags: &[&str]) -> SnippetDraft {
    SnippetDraft {
        title: title.to_string(),
        description: None,
        code: format!("// {title}"),
        language: language.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        favorite: false,
    }
}
