use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Snippet, SnippetDraft, Tag};
use crate::store::SnippetStore;

const SNIPPET_COLUMNS: &str =
    "id, owner_id, title, description, code, language, favorite, created_at, updated_at";

/// PostgreSQL-backed store. Every method is a single statement against the
/// hosted schema; cross-row consistency is the concern of the layers above.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnippetStore for PgStore {
    async fn snippets_by_owner(&self, owner_id: Uuid) -> Result<Vec<Snippet>> {
        let snippets = sqlx::query_as::<_, Snippet>(&format!(
            r#"
            SELECT {SNIPPET_COLUMNS}
              FROM snippets
             WHERE owner_id = $1
             ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(snippets)
    }

    async fn snippets_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Snippet>> {
        let snippets = sqlx::query_as::<_, Snippet>(&format!(
            r#"
            SELECT {SNIPPET_COLUMNS}
              FROM snippets
             WHERE id = ANY($1)
             ORDER BY created_at DESC
            "#
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(snippets)
    }

    async fn snippet_by_id(&self, id: Uuid) -> Result<Option<Snippet>> {
        let snippet = sqlx::query_as::<_, Snippet>(&format!(
            r#"
            SELECT {SNIPPET_COLUMNS}
              FROM snippets
             WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(snippet)
    }

    async fn insert_snippet(&self, owner_id: Uuid, draft: &SnippetDraft) -> Result<Snippet> {
        let snippet = sqlx::query_as::<_, Snippet>(&format!(
            r#"
            INSERT INTO snippets (owner_id, title, description, code, language, favorite)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SNIPPET_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.code)
        .bind(&draft.language)
        .bind(draft.favorite)
        .fetch_one(&self.pool)
        .await?;
        Ok(snippet)
    }

    async fn update_snippet(
        &self,
        id: Uuid,
        owner_id: Uuid,
        draft: &SnippetDraft,
    ) -> Result<Snippet> {
        let snippet = sqlx::query_as::<_, Snippet>(&format!(
            r#"
            UPDATE snippets
               SET title       = $1,
                   description = $2,
                   code        = $3,
                   language    = $4,
                   updated_at  = NOW()
             WHERE id = $5
               AND owner_id = $6
            RETURNING {SNIPPET_COLUMNS}
            "#
        ))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.code)
        .bind(&draft.language)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        snippet.ok_or(Error::SnippetNotFound(id))
    }

    async fn set_favorite(&self, id: Uuid, owner_id: Uuid, favorite: bool) -> Result<Snippet> {
        let snippet = sqlx::query_as::<_, Snippet>(&format!(
            r#"
            UPDATE snippets
               SET favorite = $1
             WHERE id = $2
               AND owner_id = $3
            RETURNING {SNIPPET_COLUMNS}
            "#
        ))
        .bind(favorite)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        snippet.ok_or(Error::SnippetNotFound(id))
    }

    async fn delete_snippet(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let deleted = sqlx::query_scalar::<_, Uuid>(
            r#"
            DELETE FROM snippets
             WHERE id = $1
               AND owner_id = $2
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(Error::SnippetNotFound(id)),
        }
    }

    async fn upsert_tag(&self, name: &str) -> Result<Tag> {
        // DO UPDATE instead of DO NOTHING so RETURNING always yields the row,
        // closing the look-then-create race in a single statement
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(tag)
    }

    async fn tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, created_at
              FROM tags
             WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tag)
    }

    async fn all_tags(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, created_at
              FROM tags
             ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn tags_for_snippet(&self, snippet_id: Uuid) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.created_at
              FROM snippet_tags st
              JOIN tags t
                ON t.id = st.tag_id
             WHERE st.snippet_id = $1
            "#,
        )
        .bind(snippet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn snippet_ids_for_tag(&self, tag_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT snippet_id
              FROM snippet_tags
             WHERE tag_id = $1
            "#,
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn link_count_for_tag(&self, tag_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
              FROM snippet_tags
             WHERE tag_id = $1
            "#,
        )
        .bind(tag_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn delete_links_for_snippet(&self, snippet_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM snippet_tags
             WHERE snippet_id = $1
            "#,
        )
        .bind(snippet_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_link(&self, snippet_id: Uuid, tag_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO snippet_tags (snippet_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(snippet_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
