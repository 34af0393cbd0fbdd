use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Snippet, SnippetDraft, Tag};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Primitive query/mutation surface of the hosted relational store.
///
/// One backend round-trip per method, and no transactions: the
/// reconciliation and fetch-join layers are written against exactly this
/// granularity, so implementations must not batch several steps behind a
/// single call.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    // snippets
    /// Snippet rows for an owner, newest first.
    async fn snippets_by_owner(&self, owner_id: Uuid) -> Result<Vec<Snippet>>;
    async fn snippets_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Snippet>>;
    async fn snippet_by_id(&self, id: Uuid) -> Result<Option<Snippet>>;
    async fn insert_snippet(&self, owner_id: Uuid, draft: &SnippetDraft) -> Result<Snippet>;
    /// Owner-scoped content update; bumps `updated_at`, leaves the favorite
    /// flag alone. `SnippetNotFound` when the row is absent or owned by
    /// someone else.
    async fn update_snippet(&self, id: Uuid, owner_id: Uuid, draft: &SnippetDraft)
        -> Result<Snippet>;
    async fn set_favorite(&self, id: Uuid, owner_id: Uuid, favorite: bool) -> Result<Snippet>;
    /// Owner-scoped delete; the backend cascades the snippet's associations.
    async fn delete_snippet(&self, id: Uuid, owner_id: Uuid) -> Result<()>;

    // tags
    /// Insert a tag, or return the existing row on a name conflict.
    async fn upsert_tag(&self, name: &str) -> Result<Tag>;
    async fn tag_by_name(&self, name: &str) -> Result<Option<Tag>>;
    async fn all_tags(&self) -> Result<Vec<Tag>>;

    // associations
    async fn tags_for_snippet(&self, snippet_id: Uuid) -> Result<Vec<Tag>>;
    async fn snippet_ids_for_tag(&self, tag_id: Uuid) -> Result<Vec<Uuid>>;
    async fn link_count_for_tag(&self, tag_id: Uuid) -> Result<i64>;
    async fn delete_links_for_snippet(&self, snippet_id: Uuid) -> Result<()>;
    /// Inserting an already-present pair is a no-op.
    async fn insert_link(&self, snippet_id: Uuid, tag_id: Uuid) -> Result<()>;
}
