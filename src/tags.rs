use futures_util::future::join_all;
use log::warn;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Tag, TagWithCount};
use crate::store::SnippetStore;
use crate::validation::{self, ValidationErrors};

/// Makes the snippet's association set match `names` exactly: each distinct
/// case-folded name resolves to a tag (created on first use), then the full
/// link set is replaced: delete everything, insert the new set.
///
/// The replacement is not atomic. Every name is resolved up front so a tag
/// failure cannot touch the link table, but a failure between the delete and
/// the last insert leaves a partial set and surfaces as
/// `Error::TagSyncInterrupted`.
pub async fn reconcile_snippet_tags(
    store: &dyn SnippetStore,
    snippet_id: Uuid,
    names: &[String],
) -> Result<Vec<Tag>> {
    let mut wanted: Vec<String> = Vec::new();
    for raw in names {
        let name = validation::validate_tag(raw)
            .map_err(|message| ValidationErrors::single("tags", message))?;
        if !wanted.contains(&name) {
            wanted.push(name);
        }
    }

    let mut resolved = Vec::with_capacity(wanted.len());
    for name in &wanted {
        resolved.push(store.upsert_tag(name).await?);
    }

    store.delete_links_for_snippet(snippet_id).await?;
    for tag in &resolved {
        store
            .insert_link(snippet_id, tag.id)
            .await
            .map_err(|source| Error::TagSyncInterrupted {
                snippet_id,
                source: Box::new(source),
            })?;
    }
    Ok(resolved)
}

/// Every tag with the number of snippets it is attached to, busiest first.
/// Counts resolve concurrently; a failed count degrades to zero rather than
/// failing the listing.
pub async fn tags_with_counts(store: &dyn SnippetStore) -> Result<Vec<TagWithCount>> {
    let tags = store.all_tags().await?;
    let counts = join_all(tags.iter().map(|t| store.link_count_for_tag(t.id))).await;

    let mut listed: Vec<TagWithCount> = tags
        .into_iter()
        .zip(counts)
        .map(|(tag, count)| {
            let snippet_count = match count {
                Ok(n) => n,
                Err(err) => {
                    warn!("count lookup failed for tag {}: {err}", tag.id);
                    0
                }
            };
            TagWithCount { tag, snippet_count }
        })
        .collect();
    listed.sort_by(|a, b| b.snippet_count.cmp(&a.snippet_count));
    Ok(listed)
}
