use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ______________________________________ Snippets ______________________________________
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Snippet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate snippet payload as submitted by a form, before validation.
/// `crate::validation::validate_snippet` turns it into its normalized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnippetDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
}

// ______________________________________ Tags ______________________________________
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SnippetTag {
    pub snippet_id: Uuid,
    pub tag_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ______________________________________ View models ______________________________________

/// A snippet with its tag set resolved, assembled in memory at read time.
/// Never persisted; the association table stays the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetWithTags {
    #[serde(flatten)]
    pub snippet: Snippet,
    pub tags: Vec<Tag>,
}

impl SnippetWithTags {
    pub fn new(snippet: Snippet, tags: Vec<Tag>) -> Self {
        Self { snippet, tags }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    pub snippet_count: i64,
}
