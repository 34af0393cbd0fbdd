use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::SnippetWithTags;

/// Backup document assembled entirely from already-fetched data; writing it
/// somewhere is the embedder's business.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    /// Address of the exporting principal.
    pub exported_by: String,
    pub snippets_count: usize,
    pub snippets: Vec<SnippetWithTags>,
}

impl ExportDocument {
    pub fn build(exported_by: impl Into<String>, snippets: Vec<SnippetWithTags>) -> Self {
        Self {
            exported_at: Utc::now(),
            exported_by: exported_by.into(),
            snippets_count: snippets.len(),
            snippets,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn suggested_filename(&self) -> String {
        format!("snippets-backup-{}.json", self.exported_at.format("%Y-%m-%d"))
    }
}
