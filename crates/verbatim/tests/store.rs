use std::io::Write;

use verbatim::error::VerbatimError;
use verbatim::feedback::Feedback;
use verbatim::store::{FeedbackStore, JsonlFeedbackStore, SearchFilters};

fn embedded(text: &str, country: Option<&str>, platform: Option<&str>, rating: Option<i32>, embedding: Vec<f32>) -> Feedback {
  let mut feedback = Feedback::new(text).unwrap();
  feedback.country = country.map(str::to_string);
  feedback.platform = platform.map(str::to_string);
  feedback.rating = rating;
  feedback.set_embedding(embedding);
  feedback
}

fn android_filter() -> SearchFilters {
  SearchFilters { platform: Some("android".to_string()), ..Default::default() }
}

#[tokio::test]
async fn test_results_satisfy_every_specified_filter() {
  let store = JsonlFeedbackStore::in_memory();
  let rows = [
    ("a", Some("DE"), Some("android"), Some(1)),
    ("b", Some("DE"), Some("ios"), Some(4)),
    ("c", Some("FR"), Some("android"), Some(3)),
    ("d", Some("DE"), Some("android"), Some(5)),
    ("e", None, Some("android"), None),
  ];
  for (text, country, platform, rating) in rows {
    store.insert(&embedded(text, country, platform, rating, vec![1.0, 0.0])).await.unwrap();
  }

  let filters = SearchFilters {
    country: Some("DE".to_string()),
    platform: Some("android".to_string()),
    min_rating: Some(2),
  };
  let results = store.search(&[1.0, 0.0], 10, &filters).await.unwrap();

  assert_eq!(results.len(), 1);
  for item in &results {
    assert_eq!(item.country.as_deref(), Some("DE"));
    assert_eq!(item.platform.as_deref(), Some("android"));
    assert!(item.rating.unwrap() >= 2);
  }
}

#[tokio::test]
async fn test_results_ordered_by_similarity_then_id() {
  let store = JsonlFeedbackStore::in_memory();
  // Two identical embeddings (tie) and one further away.
  store.insert(&embedded("far", None, None, None, vec![0.0, 1.0])).await.unwrap();
  store.insert(&embedded("tie-late", None, None, None, vec![1.0, 0.0])).await.unwrap();
  store.insert(&embedded("tie-early", None, None, None, vec![1.0, 0.0])).await.unwrap();

  let results = store.search(&[1.0, 0.0], 10, &SearchFilters::default()).await.unwrap();

  let ids: Vec<u64> = results.iter().map(|r| r.id).collect();
  // ids 2 and 3 tie at similarity 1.0; the lower id wins. id 1 is orthogonal.
  assert_eq!(ids, vec![2, 3, 1]);
  assert!(results[0].similarity >= results[1].similarity);
  assert!(results[1].similarity >= results[2].similarity);
}

#[tokio::test]
async fn test_filtering_happens_before_limiting() {
  let store = JsonlFeedbackStore::in_memory();
  // The single closest record is on ios; with a top_k of 1 and an android
  // filter, the android record must win, never an empty result.
  store.insert(&embedded("closest but ios", None, Some("ios"), None, vec![1.0, 0.0])).await.unwrap();
  store
    .insert(&embedded("second closest, android", None, Some("android"), None, vec![0.9, 0.1]))
    .await
    .unwrap();

  let results = store.search(&[1.0, 0.0], 1, &android_filter()).await.unwrap();

  assert_eq!(results.len(), 1);
  assert_eq!(results[0].id, 2);
  assert_eq!(results[0].content, "second closest, android");
}

#[tokio::test]
async fn test_top_k_beyond_population_returns_everything() {
  let store = JsonlFeedbackStore::in_memory();
  store.insert(&embedded("one", None, None, None, vec![1.0, 0.0])).await.unwrap();
  store.insert(&embedded("two", None, None, None, vec![0.5, 0.5])).await.unwrap();

  let results = store.search(&[1.0, 0.0], 50, &SearchFilters::default()).await.unwrap();
  assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_zero_matches_is_empty_not_an_error() {
  let store = JsonlFeedbackStore::in_memory();
  store.insert(&embedded("ios only", None, Some("ios"), None, vec![1.0, 0.0])).await.unwrap();

  let results = store.search(&[1.0, 0.0], 5, &android_filter()).await.unwrap();
  assert!(results.is_empty());
}

#[tokio::test]
async fn test_dimension_mismatch_rejected_and_store_unchanged() {
  let store = JsonlFeedbackStore::in_memory();
  store.insert(&embedded("first", None, None, None, vec![1.0, 0.0, 0.0])).await.unwrap();

  let result = store.insert(&embedded("wrong dims", None, None, None, vec![1.0, 0.0])).await;
  match result.unwrap_err() {
    VerbatimError::DimensionMismatch { expected, actual } => {
      assert_eq!(expected, 3);
      assert_eq!(actual, 2);
    }
    other => panic!("expected DimensionMismatch, got {other}"),
  }

  // Prior contents untouched, and correctly-sized inserts still work.
  assert_eq!(store.count().await.unwrap(), 1);
  store.insert(&embedded("right dims", None, None, None, vec![0.0, 1.0, 0.0])).await.unwrap();
  assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_insert_without_embedding_is_invalid() {
  let store = JsonlFeedbackStore::in_memory();
  let feedback = Feedback::new("never embedded").unwrap();

  let result = store.insert(&feedback).await;
  assert!(matches!(result.unwrap_err(), VerbatimError::InvalidInput(_)));
}

#[tokio::test]
async fn test_ids_are_assigned_once_and_never_reused() {
  let temp = tempfile::TempDir::new().unwrap();
  let path = temp.path().join("feedback.jsonl");

  {
    let store = JsonlFeedbackStore::open(&path).unwrap();
    let first = store.insert(&embedded("one", None, None, None, vec![1.0, 0.0])).await.unwrap();
    let second = store.insert(&embedded("two", None, None, None, vec![0.0, 1.0])).await.unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 2);
  }

  // Reopen: records survive, and new ids continue past the old maximum.
  let store = JsonlFeedbackStore::open(&path).unwrap();
  assert_eq!(store.count().await.unwrap(), 2);
  let third = store.insert(&embedded("three", None, None, None, vec![1.0, 1.0])).await.unwrap();
  assert_eq!(third, 3);

  let results = store.search(&[1.0, 0.0], 10, &SearchFilters::default()).await.unwrap();
  assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_reopened_store_enforces_established_dimension() {
  let temp = tempfile::TempDir::new().unwrap();
  let path = temp.path().join("feedback.jsonl");

  {
    let store = JsonlFeedbackStore::open(&path).unwrap();
    store.insert(&embedded("one", None, None, None, vec![1.0, 0.0, 0.0])).await.unwrap();
  }

  let store = JsonlFeedbackStore::open(&path).unwrap();
  let result = store.insert(&embedded("short", None, None, None, vec![1.0])).await;
  assert!(matches!(result.unwrap_err(), VerbatimError::DimensionMismatch { expected: 3, actual: 1 }));
}

#[test]
fn test_corrupt_store_file_fails_open() {
  let temp = tempfile::TempDir::new().unwrap();
  let path = temp.path().join("feedback.jsonl");
  std::fs::write(&path, "this is not json\n").unwrap();

  let result = JsonlFeedbackStore::open(&path);
  assert!(result.is_err());
  assert!(result.unwrap_err().to_string().contains("corrupt store line 1"));
}

#[test]
fn test_mixed_dimension_file_fails_open() {
  let temp = tempfile::TempDir::new().unwrap();
  let path = temp.path().join("feedback.jsonl");

  let mut file = std::fs::File::create(&path).unwrap();
  writeln!(
    file,
    r#"{{"id":1,"source":"app_reviews","country":null,"platform":null,"rating":null,"user_type":null,"created_at":null,"text":"a","embedding":[1.0,0.0]}}"#
  )
  .unwrap();
  writeln!(
    file,
    r#"{{"id":2,"source":"app_reviews","country":null,"platform":null,"rating":null,"user_type":null,"created_at":null,"text":"b","embedding":[1.0,0.0,0.0]}}"#
  )
  .unwrap();

  let result = JsonlFeedbackStore::open(&path);
  assert!(result.is_err());
  assert!(result.unwrap_err().to_string().contains("integrity violation"));
}

#[tokio::test]
async fn test_concurrent_inserts_are_atomic() {
  let store = std::sync::Arc::new(JsonlFeedbackStore::in_memory());

  let mut handles = Vec::new();
  for i in 0..16 {
    let store = store.clone();
    handles.push(tokio::spawn(async move {
      let feedback = embedded(&format!("row {i}"), None, None, None, vec![1.0, 0.0]);
      store.insert(&feedback).await.unwrap()
    }));
  }

  let mut ids = Vec::new();
  for handle in handles {
    ids.push(handle.await.unwrap());
  }

  ids.sort_unstable();
  ids.dedup();
  assert_eq!(ids.len(), 16, "every insert got a distinct id");
  assert_eq!(store.count().await.unwrap(), 16);
}
