use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::SnippetWithTags;

// Pure derivations over an already-fetched snippet list. Nothing in this
// module touches the store.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    TitleAsc,
    TitleDesc,
    Language,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LanguageFilter {
    #[default]
    All,
    Exact(String),
}

impl LanguageFilter {
    fn matches(&self, language: &str) -> bool {
        match self {
            LanguageFilter::All => true,
            LanguageFilter::Exact(wanted) => wanted == language,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SnippetFilter {
    pub query: String,
    pub language: LanguageFilter,
    pub favorites_only: bool,
}

/// Subset where the case-insensitive query matches title, description, code
/// or any tag name, the language filter holds, and (if set) the favorite
/// flag is on. An empty query matches everything; input order is preserved.
pub fn filter(snippets: &[SnippetWithTags], criteria: &SnippetFilter) -> Vec<SnippetWithTags> {
    let query = criteria.query.trim().to_lowercase();
    snippets
        .iter()
        .filter(|s| {
            let snip = &s.snippet;
            let matches_query = query.is_empty()
                || snip.title.to_lowercase().contains(&query)
                || snip
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&query))
                || snip.code.to_lowercase().contains(&query)
                || s.tags.iter().any(|t| t.name.to_lowercase().contains(&query));

            matches_query
                && criteria.language.matches(&snip.language)
                && (!criteria.favorites_only || snip.favorite)
        })
        .cloned()
        .collect()
}

/// Stable in-place reorder. Title and language keys compare case-folded;
/// locale collation is left to the presentation layer.
pub fn sort(snippets: &mut [SnippetWithTags], key: SortKey) {
    match key {
        SortKey::Newest => {
            snippets.sort_by(|a, b| b.snippet.created_at.cmp(&a.snippet.created_at));
        }
        SortKey::Oldest => {
            snippets.sort_by(|a, b| a.snippet.created_at.cmp(&b.snippet.created_at));
        }
        SortKey::TitleAsc => {
            snippets.sort_by(|a, b| fold(&a.snippet.title).cmp(&fold(&b.snippet.title)));
        }
        SortKey::TitleDesc => {
            snippets.sort_by(|a, b| fold(&b.snippet.title).cmp(&fold(&a.snippet.title)));
        }
        SortKey::Language => {
            snippets.sort_by(|a, b| fold(&a.snippet.language).cmp(&fold(&b.snippet.language)));
        }
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageCount {
    pub language: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultStats {
    pub total: usize,
    pub favorites: usize,
    pub languages: HashMap<String, usize>,
    pub top_language: Option<LanguageCount>,
}

impl VaultStats {
    /// Rounded share of favorites, 0 for an empty vault.
    pub fn favorite_percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((self.favorites as f64 / self.total as f64) * 100.0).round() as u32
        }
    }
}

/// Aggregates over the full list. An empty list yields zero counts and no
/// top language; count ties go to the language encountered first.
pub fn stats(snippets: &[SnippetWithTags]) -> VaultStats {
    let mut languages: HashMap<String, usize> = HashMap::new();
    for s in snippets {
        *languages.entry(s.snippet.language.clone()).or_insert(0) += 1;
    }

    let mut top_language: Option<LanguageCount> = None;
    for s in snippets {
        let count = languages[&s.snippet.language];
        let better = top_language.as_ref().map_or(true, |best| count > best.count);
        if better {
            top_language = Some(LanguageCount {
                language: s.snippet.language.clone(),
                count,
            });
        }
    }

    VaultStats {
        total: snippets.len(),
        favorites: snippets.iter().filter(|s| s.snippet.favorite).count(),
        languages,
        top_language,
    }
}
