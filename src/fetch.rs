use futures_util::future::join_all;
use log::warn;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Snippet, SnippetWithTags};
use crate::store::SnippetStore;

/// Two-step fetch-join: the store exposes no snippet/tag join to the client,
/// so snippet rows come first and each row's tag set is resolved with its
/// own concurrent query. The result keeps the snippet query's order and
/// length; a failed per-snippet tag query degrades that snippet to an empty
/// tag set instead of failing the batch.
pub async fn snippets_with_tags_by_owner(
    store: &dyn SnippetStore,
    owner_id: Uuid,
) -> Result<Vec<SnippetWithTags>> {
    let snippets = store.snippets_by_owner(owner_id).await?;
    Ok(attach_tags(store, snippets).await)
}

pub async fn snippets_with_tags_by_ids(
    store: &dyn SnippetStore,
    ids: &[Uuid],
) -> Result<Vec<SnippetWithTags>> {
    let snippets = store.snippets_by_ids(ids).await?;
    Ok(attach_tags(store, snippets).await)
}

pub async fn snippets_with_tags_by_tag(
    store: &dyn SnippetStore,
    tag_id: Uuid,
) -> Result<Vec<SnippetWithTags>> {
    let ids = store.snippet_ids_for_tag(tag_id).await?;
    let snippets = store.snippets_by_ids(&ids).await?;
    Ok(attach_tags(store, snippets).await)
}

pub async fn snippet_with_tags(
    store: &dyn SnippetStore,
    id: Uuid,
) -> Result<Option<SnippetWithTags>> {
    match store.snippet_by_id(id).await? {
        Some(snippet) => {
            let mut joined = attach_tags(store, vec![snippet]).await;
            Ok(joined.pop())
        }
        None => Ok(None),
    }
}

async fn attach_tags(store: &dyn SnippetStore, snippets: Vec<Snippet>) -> Vec<SnippetWithTags> {
    let tag_sets = join_all(snippets.iter().map(|s| store.tags_for_snippet(s.id))).await;
    snippets
        .into_iter()
        .zip(tag_sets)
        .map(|(snippet, tags)| {
            let tags = match tags {
                Ok(tags) => tags,
                Err(err) => {
                    warn!("tag lookup failed for snippet {}: {err}", snippet.id);
                    Vec::new()
                }
            };
            SnippetWithTags::new(snippet, tags)
        })
        .collect()
}
