mod common;

use common::TestHarness;
use snipvault::fetch;
use snipvault::models::SnippetDraft;
use snipvault::views::{LanguageFilter, SnippetFilter, SortKey};
use snipvault::Error;

#[tokio::test]
async fn operations_require_a_signed_in_principal() {
    let harness = TestHarness::new();
    let err = harness.client.all_snippets().await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));

    let err = harness
        .client
        .create_snippet(&common::draft("A", "rust", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
}

#[tokio::test]
async fn create_normalizes_then_persists_and_links() {
    let harness = TestHarness::signed_in().await;
    let created = harness
        .client
        .create_snippet(&SnippetDraft {
            title: "  Debounce Hook  ".to_string(),
            description: Some("  ".to_string()),
            code: "export const useDebounce = () => {}".to_string(),
            language: " typescript ".to_string(),
            tags: vec!["React".to_string(), "Hooks".to_string(), "react".to_string()],
            favorite: false,
        })
        .await
        .unwrap();

    assert_eq!(created.snippet.title, "Debounce Hook");
    assert_eq!(created.snippet.description, None);
    assert_eq!(created.snippet.language, "typescript");
    let names: Vec<_> = created.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["react", "hooks"]);
}

#[tokio::test]
async fn create_rejects_invalid_payloads_without_persisting() {
    let harness = TestHarness::signed_in().await;
    let err = harness
        .client
        .create_snippet(&common::draft("", "rust", &[]))
        .await
        .unwrap_err();
    let Error::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.message_for("title"), Some("Title is required"));
    assert!(harness.client.all_snippets().await.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_join_returns_every_snippet_with_its_tags() {
    let harness = TestHarness::signed_in().await;
    harness
        .client
        .create_snippet(&common::draft("Quick Sort", "python", &[]))
        .await
        .unwrap();
    harness
        .client
        .create_snippet(&common::draft("Debounce Hook", "typescript", &["react", "hooks"]))
        .await
        .unwrap();

    let all = harness.client.all_snippets().await.unwrap();
    assert_eq!(all.len(), 2);
    // newest first
    assert_eq!(all[0].snippet.title, "Debounce Hook");
    assert_eq!(all[0].tags.len(), 2);
    assert_eq!(all[1].snippet.title, "Quick Sort");
    assert!(all[1].tags.is_empty());
}

#[tokio::test]
async fn failed_tag_lookup_degrades_to_empty_not_fatal() {
    let harness = TestHarness::signed_in().await;
    let broken = harness
        .client
        .create_snippet(&common::draft("A", "rust", &["tagged"]))
        .await
        .unwrap();
    harness
        .client
        .create_snippet(&common::draft("B", "rust", &["tagged"]))
        .await
        .unwrap();

    harness.store.break_tag_lookup(broken.snippet.id).await;
    let all = harness.client.all_snippets().await.unwrap();
    assert_eq!(all.len(), 2);

    let damaged = all
        .iter()
        .find(|s| s.snippet.id == broken.snippet.id)
        .unwrap();
    assert!(damaged.tags.is_empty());
    let intact = all
        .iter()
        .find(|s| s.snippet.id != broken.snippet.id)
        .unwrap();
    assert_eq!(intact.tags.len(), 1);
}

#[tokio::test]
async fn failed_snippet_query_fails_the_whole_operation() {
    let harness = TestHarness::signed_in().await;
    harness.store.break_owner_queries().await;
    let err = harness.client.all_snippets().await.unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
}

#[tokio::test]
async fn update_replaces_content_and_tag_set() {
    let harness = TestHarness::signed_in().await;
    let created = harness
        .client
        .create_snippet(&common::draft("Old Title", "rust", &["old"]))
        .await
        .unwrap();

    let updated = harness
        .client
        .update_snippet(
            created.snippet.id,
            &common::draft("New Title", "rust", &["new", "fresh"]),
        )
        .await
        .unwrap();

    assert_eq!(updated.snippet.title, "New Title");
    let names: Vec<_> = updated.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["new", "fresh"]);
    assert_eq!(
        harness
            .store
            .links_for_snippet(created.snippet.id)
            .await
            .len(),
        2
    );
}

#[tokio::test]
async fn snippets_are_invisible_to_other_principals() {
    let harness = TestHarness::signed_in().await;
    let created = harness
        .client
        .create_snippet(&common::draft("Mine", "rust", &[]))
        .await
        .unwrap();

    harness.client.sign_out().await.unwrap();
    harness
        .client
        .sign_up(&common::signup("other@example.com"))
        .await
        .unwrap();
    harness
        .client
        .sign_in(&common::login("other@example.com"))
        .await
        .unwrap();

    assert!(harness.client.all_snippets().await.unwrap().is_empty());

    let err = harness.client.snippet(created.snippet.id).await.unwrap_err();
    assert!(matches!(err, Error::SnippetNotFound(_)));
    let err = harness
        .client
        .update_snippet(created.snippet.id, &common::draft("Stolen", "rust", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SnippetNotFound(_)));
    let err = harness
        .client
        .delete_snippet(created.snippet.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SnippetNotFound(_)));
}

#[tokio::test]
async fn delete_removes_snippet_and_cascades_links() {
    let harness = TestHarness::signed_in().await;
    let created = harness
        .client
        .create_snippet(&common::draft("Doomed", "rust", &["a", "b"]))
        .await
        .unwrap();

    harness.client.delete_snippet(created.snippet.id).await.unwrap();
    assert!(harness.client.all_snippets().await.unwrap().is_empty());
    assert!(harness
        .store
        .links_for_snippet(created.snippet.id)
        .await
        .is_empty());
}

#[tokio::test]
async fn toggle_favorite_flips_the_flag() {
    let harness = TestHarness::signed_in().await;
    let created = harness
        .client
        .create_snippet(&common::draft("Starred", "rust", &[]))
        .await
        .unwrap();
    assert!(!created.snippet.favorite);

    let toggled = harness
        .client
        .toggle_favorite(created.snippet.id)
        .await
        .unwrap();
    assert!(toggled.favorite);
    let toggled = harness
        .client
        .toggle_favorite(created.snippet.id)
        .await
        .unwrap();
    assert!(!toggled.favorite);
}

#[tokio::test]
async fn list_snippets_applies_filter_and_sort() {
    let harness = TestHarness::signed_in().await;
    harness
        .client
        .create_snippet(&common::draft("Debounce Hook", "typescript", &["react", "hooks"]))
        .await
        .unwrap();
    harness
        .client
        .create_snippet(&common::draft("Quick Sort", "python", &[]))
        .await
        .unwrap();

    let hooked = harness
        .client
        .list_snippets(
            &SnippetFilter {
                query: "hook".to_string(),
                ..Default::default()
            },
            SortKey::Newest,
        )
        .await
        .unwrap();
    assert_eq!(hooked.len(), 1);
    assert_eq!(hooked[0].snippet.title, "Debounce Hook");

    let python_only = harness
        .client
        .list_snippets(
            &SnippetFilter {
                language: LanguageFilter::Exact("python".to_string()),
                ..Default::default()
            },
            SortKey::Newest,
        )
        .await
        .unwrap();
    assert_eq!(python_only.len(), 1);
    assert_eq!(python_only[0].snippet.title, "Quick Sort");

    let by_title = harness
        .client
        .list_snippets(&SnippetFilter::default(), SortKey::TitleAsc)
        .await
        .unwrap();
    let titles: Vec<_> = by_title.iter().map(|s| s.snippet.title.as_str()).collect();
    assert_eq!(titles, vec!["Debounce Hook", "Quick Sort"]);
}

#[tokio::test]
async fn snippets_for_tag_stay_owner_scoped() {
    let harness = TestHarness::signed_in().await;
    let mine = harness
        .client
        .create_snippet(&common::draft("Mine", "rust", &["shared"]))
        .await
        .unwrap();
    let tag_id = mine.tags[0].id;

    // another principal reuses the globally-named tag
    harness.client.sign_out().await.unwrap();
    harness
        .client
        .sign_up(&common::signup("other@example.com"))
        .await
        .unwrap();
    harness
        .client
        .sign_in(&common::login("other@example.com"))
        .await
        .unwrap();
    harness
        .client
        .create_snippet(&common::draft("Theirs", "rust", &["shared"]))
        .await
        .unwrap();

    let theirs = harness.client.snippets_for_tag(tag_id).await.unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].snippet.title, "Theirs");
}

#[tokio::test]
async fn stats_and_export_reflect_the_owned_vault() {
    let harness = TestHarness::signed_in().await;
    harness
        .client
        .create_snippet(&common::draft("A", "rust", &["a"]))
        .await
        .unwrap();
    let starred = harness
        .client
        .create_snippet(&common::draft("B", "rust", &[]))
        .await
        .unwrap();
    harness
        .client
        .toggle_favorite(starred.snippet.id)
        .await
        .unwrap();

    let stats = harness.client.stats().await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.favorites, 1);
    assert_eq!(stats.top_language.as_ref().unwrap().language, "rust");
    assert_eq!(stats.favorite_percent(), 50);

    let export = harness.client.export().await.unwrap();
    assert_eq!(export.exported_by, common::EMAIL);
    assert_eq!(export.snippets_count, 2);
    assert_eq!(export.snippets.len(), 2);
}

#[tokio::test]
async fn fetch_join_by_explicit_ids() {
    let harness = TestHarness::signed_in().await;
    let a = harness
        .client
        .create_snippet(&common::draft("A", "rust", &["x"]))
        .await
        .unwrap();
    harness
        .client
        .create_snippet(&common::draft("B", "rust", &[]))
        .await
        .unwrap();

    let joined = fetch::snippets_with_tags_by_ids(harness.store.as_ref(), &[a.snippet.id])
        .await
        .unwrap();
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].snippet.id, a.snippet.id);
    assert_eq!(joined[0].tags.len(), 1);
}
