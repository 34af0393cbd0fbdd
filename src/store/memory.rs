use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Snippet, SnippetDraft, SnippetTag, Tag};
use crate::store::SnippetStore;

#[derive(Default)]
struct Inner {
    snippets: Vec<Snippet>,
    tags: Vec<Tag>,
    links: Vec<SnippetTag>,
}

/// In-memory store with the same observable behavior as `PgStore`. Used by
/// the test suite and by embedders who want a vault without a database.
///
/// The `break_*` hooks make individual queries fail, which is how the
/// degradation paths of the fetch-join and reconciliation layers are
/// exercised.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    broken_tag_lookups: Mutex<HashSet<Uuid>>,
    broken_owner_queries: Mutex<bool>,
    broken_link_inserts: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `tags_for_snippet` fail for one snippet.
    pub async fn break_tag_lookup(&self, snippet_id: Uuid) {
        self.broken_tag_lookups.lock().await.insert(snippet_id);
    }

    /// Make `snippets_by_owner` fail outright.
    pub async fn break_owner_queries(&self) {
        *self.broken_owner_queries.lock().await = true;
    }

    /// Make `insert_link` fail, stranding a reconciliation between its
    /// delete and its inserts.
    pub async fn break_link_inserts(&self) {
        *self.broken_link_inserts.lock().await = true;
    }

    pub async fn repair(&self) {
        self.broken_tag_lookups.lock().await.clear();
        *self.broken_owner_queries.lock().await = false;
        *self.broken_link_inserts.lock().await = false;
    }

    /// Raw association pairs, for asserting on the table directly.
    pub async fn links_for_snippet(&self, snippet_id: Uuid) -> Vec<Uuid> {
        self.inner
            .lock()
            .await
            .links
            .iter()
            .filter(|l| l.snippet_id == snippet_id)
            .map(|l| l.tag_id)
            .collect()
    }
}

#[async_trait]
impl SnippetStore for MemoryStore {
    async fn snippets_by_owner(&self, owner_id: Uuid) -> Result<Vec<Snippet>> {
        if *self.broken_owner_queries.lock().await {
            return Err(Error::Backend("snippet query unavailable".to_string()));
        }
        let inner = self.inner.lock().await;
        // newest insertion first on equal timestamps, matching the storage
        // ORDER BY created_at DESC
        let mut snippets: Vec<Snippet> = inner
            .snippets
            .iter()
            .rev()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        snippets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(snippets)
    }

    async fn snippets_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Snippet>> {
        let inner = self.inner.lock().await;
        let mut snippets: Vec<Snippet> = inner
            .snippets
            .iter()
            .rev()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect();
        snippets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(snippets)
    }

    async fn snippet_by_id(&self, id: Uuid) -> Result<Option<Snippet>> {
        let inner = self.inner.lock().await;
        Ok(inner.snippets.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_snippet(&self, owner_id: Uuid, draft: &SnippetDraft) -> Result<Snippet> {
        let now = Utc::now();
        let snippet = Snippet {
            id: Uuid::new_v4(),
            owner_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            code: draft.code.clone(),
            language: draft.language.clone(),
            favorite: draft.favorite,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.snippets.push(snippet.clone());
        Ok(snippet)
    }

    async fn update_snippet(
        &self,
        id: Uuid,
        owner_id: Uuid,
        draft: &SnippetDraft,
    ) -> Result<Snippet> {
        let mut inner = self.inner.lock().await;
        let snippet = inner
            .snippets
            .iter_mut()
            .find(|s| s.id == id && s.owner_id == owner_id)
            .ok_or(Error::SnippetNotFound(id))?;
        snippet.title = draft.title.clone();
        snippet.description = draft.description.clone();
        snippet.code = draft.code.clone();
        snippet.language = draft.language.clone();
        snippet.updated_at = Utc::now();
        Ok(snippet.clone())
    }

    async fn set_favorite(&self, id: Uuid, owner_id: Uuid, favorite: bool) -> Result<Snippet> {
        let mut inner = self.inner.lock().await;
        let snippet = inner
            .snippets
            .iter_mut()
            .find(|s| s.id == id && s.owner_id == owner_id)
            .ok_or(Error::SnippetNotFound(id))?;
        snippet.favorite = favorite;
        Ok(snippet.clone())
    }

    async fn delete_snippet(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let before = inner.snippets.len();
        inner.snippets.retain(|s| !(s.id == id && s.owner_id == owner_id));
        if inner.snippets.len() == before {
            return Err(Error::SnippetNotFound(id));
        }
        // the backend schema cascades associations on snippet delete
        inner.links.retain(|l| l.snippet_id != id);
        Ok(())
    }

    async fn upsert_tag(&self, name: &str) -> Result<Tag> {
        let mut inner = self.inner.lock().await;
        if let Some(tag) = inner.tags.iter().find(|t| t.name == name) {
            return Ok(tag.clone());
        }
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        inner.tags.push(tag.clone());
        Ok(tag)
    }

    async fn tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let inner = self.inner.lock().await;
        Ok(inner.tags.iter().find(|t| t.name == name).cloned())
    }

    async fn all_tags(&self) -> Result<Vec<Tag>> {
        let inner = self.inner.lock().await;
        let mut tags = inner.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn tags_for_snippet(&self, snippet_id: Uuid) -> Result<Vec<Tag>> {
        if self.broken_tag_lookups.lock().await.contains(&snippet_id) {
            return Err(Error::Backend("association query unavailable".to_string()));
        }
        let inner = self.inner.lock().await;
        let tags = inner
            .links
            .iter()
            .filter(|l| l.snippet_id == snippet_id)
            .filter_map(|l| inner.tags.iter().find(|t| t.id == l.tag_id).cloned())
            .collect();
        Ok(tags)
    }

    async fn snippet_ids_for_tag(&self, tag_id: Uuid) -> Result<Vec<Uuid>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .links
            .iter()
            .filter(|l| l.tag_id == tag_id)
            .map(|l| l.snippet_id)
            .collect())
    }

    async fn link_count_for_tag(&self, tag_id: Uuid) -> Result<i64> {
        let inner = self.inner.lock().await;
        Ok(inner.links.iter().filter(|l| l.tag_id == tag_id).count() as i64)
    }

    async fn delete_links_for_snippet(&self, snippet_id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.links.retain(|l| l.snippet_id != snippet_id);
        Ok(())
    }

    async fn insert_link(&self, snippet_id: Uuid, tag_id: Uuid) -> Result<()> {
        if *self.broken_link_inserts.lock().await {
            return Err(Error::Backend("association insert unavailable".to_string()));
        }
        let mut inner = self.inner.lock().await;
        let exists = inner
            .links
            .iter()
            .any(|l| l.snippet_id == snippet_id && l.tag_id == tag_id);
        if !exists {
            inner.links.push(SnippetTag {
                snippet_id,
                tag_id,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }
}
