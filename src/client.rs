use std::sync::Arc;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::{AuthBackend, AuthEvent, LoginCredentials, SignupCredentials};
use crate::error::{Error, Result};
use crate::export::ExportDocument;
use crate::fetch;
use crate::models::{AuthUser, Snippet, SnippetDraft, SnippetWithTags, TagWithCount};
use crate::session::SessionMirror;
use crate::store::SnippetStore;
use crate::tags;
use crate::validation;
use crate::views::{self, SnippetFilter, SortKey, VaultStats};

/// The embedding surface: one signed-in principal working against the
/// hosted store and auth service. Pages of the original UI reduce to one or
/// two calls on this type.
///
/// Construction wires a fresh session mirror; call `init_session` before
/// relying on `session()` for guarding.
pub struct Client {
    store: Arc<dyn SnippetStore>,
    auth: Arc<dyn AuthBackend>,
    session: SessionMirror,
}

impl Client {
    pub fn new(store: Arc<dyn SnippetStore>, auth: Arc<dyn AuthBackend>) -> Self {
        Self {
            store,
            auth,
            session: SessionMirror::new(),
        }
    }

    pub fn session(&self) -> &SessionMirror {
        &self.session
    }

    /// Raw session-change notifications, for consumers that want to drive
    /// their own mirror (`SessionMirror::listen`).
    pub fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth.subscribe()
    }

    /// Resolve the mirror from the backend's current session.
    pub async fn init_session(&self) -> Result<()> {
        self.session.initialize(self.auth.as_ref()).await
    }

    // ______________________________________ Auth ______________________________________

    pub async fn sign_up(&self, credentials: &SignupCredentials) -> Result<AuthUser> {
        validation::validate_signup(credentials)?;
        self.auth.sign_up(credentials).await
    }

    pub async fn sign_in(&self, credentials: &LoginCredentials) -> Result<AuthUser> {
        validation::validate_login(credentials)?;
        let session = self.auth.sign_in(credentials).await?;
        self.session.apply(&AuthEvent::SignedIn(session.user.clone()));
        Ok(session.user)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out().await?;
        self.session.apply(&AuthEvent::SignedOut);
        Ok(())
    }

    fn current_user(&self) -> Result<AuthUser> {
        self.session.current_user().ok_or(Error::NotAuthenticated)
    }

    // ______________________________________ Snippets ______________________________________

    /// Everything the principal owns, tags resolved, newest first.
    pub async fn all_snippets(&self) -> Result<Vec<SnippetWithTags>> {
        let user = self.current_user()?;
        fetch::snippets_with_tags_by_owner(self.store.as_ref(), user.id).await
    }

    /// Fetch-join, then the in-memory filter and sort. This is what a
    /// dashboard renders.
    pub async fn list_snippets(
        &self,
        criteria: &SnippetFilter,
        order: SortKey,
    ) -> Result<Vec<SnippetWithTags>> {
        let all = self.all_snippets().await?;
        let mut shown = views::filter(&all, criteria);
        views::sort(&mut shown, order);
        Ok(shown)
    }

    pub async fn snippet(&self, id: Uuid) -> Result<SnippetWithTags> {
        let user = self.current_user()?;
        let found = fetch::snippet_with_tags(self.store.as_ref(), id).await?;
        match found {
            // someone else's row reads as absent, like the store policy would
            Some(s) if s.snippet.owner_id == user.id => Ok(s),
            _ => Err(Error::SnippetNotFound(id)),
        }
    }

    pub async fn create_snippet(&self, draft: &SnippetDraft) -> Result<SnippetWithTags> {
        let user = self.current_user()?;
        let draft = validation::validate_snippet(draft)?;
        let snippet = self.store.insert_snippet(user.id, &draft).await?;
        let tags =
            tags::reconcile_snippet_tags(self.store.as_ref(), snippet.id, &draft.tags).await?;
        Ok(SnippetWithTags::new(snippet, tags))
    }

    pub async fn update_snippet(&self, id: Uuid, draft: &SnippetDraft) -> Result<SnippetWithTags> {
        let user = self.current_user()?;
        let draft = validation::validate_snippet(draft)?;
        let snippet = self.store.update_snippet(id, user.id, &draft).await?;
        let tags =
            tags::reconcile_snippet_tags(self.store.as_ref(), snippet.id, &draft.tags).await?;
        Ok(SnippetWithTags::new(snippet, tags))
    }

    pub async fn delete_snippet(&self, id: Uuid) -> Result<()> {
        let user = self.current_user()?;
        self.store.delete_snippet(id, user.id).await
    }

    pub async fn toggle_favorite(&self, id: Uuid) -> Result<Snippet> {
        let user = self.current_user()?;
        let current = self
            .store
            .snippet_by_id(id)
            .await?
            .filter(|s| s.owner_id == user.id)
            .ok_or(Error::SnippetNotFound(id))?;
        self.store.set_favorite(id, user.id, !current.favorite).await
    }

    // ______________________________________ Tags ______________________________________

    pub async fn tags(&self) -> Result<Vec<TagWithCount>> {
        self.current_user()?;
        tags::tags_with_counts(self.store.as_ref()).await
    }

    /// Snippets of the current principal carrying the tag. Tag names are a
    /// shared namespace, so the store answer is trimmed to owned rows here.
    pub async fn snippets_for_tag(&self, tag_id: Uuid) -> Result<Vec<SnippetWithTags>> {
        let user = self.current_user()?;
        let all = fetch::snippets_with_tags_by_tag(self.store.as_ref(), tag_id).await?;
        Ok(all
            .into_iter()
            .filter(|s| s.snippet.owner_id == user.id)
            .collect())
    }

    // ______________________________________ Derived ______________________________________

    pub async fn stats(&self) -> Result<VaultStats> {
        let all = self.all_snippets().await?;
        Ok(views::stats(&all))
    }

    pub async fn export(&self) -> Result<ExportDocument> {
        let user = self.current_user()?;
        let snippets = fetch::snippets_with_tags_by_owner(self.store.as_ref(), user.id).await?;
        Ok(ExportDocument::build(user.email, snippets))
    }
}
