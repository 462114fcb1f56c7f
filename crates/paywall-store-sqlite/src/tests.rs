//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use paywall_core::{
  content::{BlockKind, RawDocument, RichTextBlock},
  provider::{ContentProvider, SessionProvider},
  session::{SessionRecord, SessionToken},
};

use crate::{Error, SqliteStore, encode::token_digest};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn doc(slug: &str, published: &str) -> RawDocument {
  RawDocument {
    slug:                  slug.into(),
    title:                 vec![RichTextBlock::new(BlockKind::Heading1, "My new post")],
    content:               vec![
      RichTextBlock::new(BlockKind::Paragraph, "Post content"),
      RichTextBlock::new(BlockKind::Paragraph, "More content"),
    ],
    last_publication_date: published.into(),
  }
}

fn record(sub: Option<&str>) -> SessionRecord {
  SessionRecord {
    subject:             "github|42".into(),
    email:               Some("johndoe@example.com".into()),
    active_subscription: sub.map(str::to_owned),
  }
}

fn token(s: &str) -> SessionToken { SessionToken::new(s).unwrap() }

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_get_document() {
  let s = store().await;
  let d = doc("my-new-post", "2021-04-01T10:00:00Z");
  s.put_document(&d).await.unwrap();

  let fetched = s.get_document("my-new-post").await.unwrap();
  assert_eq!(fetched, Some(d));
}

#[tokio::test]
async fn get_document_is_case_sensitive() {
  let s = store().await;
  s.put_document(&doc("my-new-post", "2021-04-01")).await.unwrap();
  assert!(s.get_document("My-New-Post").await.unwrap().is_none());
}

#[tokio::test]
async fn put_document_replaces_existing() {
  let s = store().await;
  s.put_document(&doc("a", "2021-04-01")).await.unwrap();
  let mut updated = doc("a", "2021-05-01");
  updated.content.truncate(1);
  s.put_document(&updated).await.unwrap();

  let all = s.list_documents().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].content.len(), 1);
  assert_eq!(all[0].last_publication_date, "2021-05-01");
}

#[tokio::test]
async fn put_document_rejects_bad_input() {
  let s = store().await;
  assert!(matches!(
    s.put_document(&doc("", "2021-04-01")).await,
    Err(Error::InvalidDocument(_))
  ));
  assert!(matches!(
    s.put_document(&doc("x", "yesterday")).await,
    Err(Error::Core(_))
  ));
}

#[tokio::test]
async fn list_documents_newest_first() {
  let s = store().await;
  s.put_document(&doc("old", "2020-01-01T00:00:00Z")).await.unwrap();
  s.put_document(&doc("new", "2022-06-01")).await.unwrap();
  s.put_document(&doc("mid", "2021-03-15T08:00:00-03:00")).await.unwrap();

  let slugs: Vec<_> = s
    .list_documents()
    .await
    .unwrap()
    .into_iter()
    .map(|d| d.slug)
    .collect();
  assert_eq!(slugs, vec!["new", "mid", "old"]);
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_get_session() {
  let s = store().await;
  let t = token("tok-1");
  s.put_session(&t, &record(Some("sub_123")), None).await.unwrap();

  let fetched = s.get_session(&t).await.unwrap();
  assert_eq!(fetched, Some(record(Some("sub_123"))));
}

#[tokio::test]
async fn unknown_token_returns_none() {
  let s = store().await;
  assert!(s.get_session(&token("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_session_returns_none() {
  let s = store().await;
  let t = token("tok-old");
  let past = Utc::now() - Duration::minutes(5);
  s.put_session(&t, &record(Some("sub_123")), Some(past)).await.unwrap();
  assert!(s.get_session(&t).await.unwrap().is_none());

  let future = Utc::now() + Duration::hours(1);
  s.put_session(&t, &record(None), Some(future)).await.unwrap();
  assert_eq!(s.get_session(&t).await.unwrap(), Some(record(None)));
}

#[tokio::test]
async fn raw_token_is_never_persisted() {
  let s = store().await;
  let t = token("super-secret-token");
  s.put_session(&t, &record(None), None).await.unwrap();

  let digest = token_digest(&t);
  let keys: Vec<String> = s
    .conn_for_tests()
    .call(|conn| {
      let mut stmt = conn.prepare("SELECT token_digest FROM sessions")?;
      let rows = stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
      Ok(rows)
    })
    .await
    .unwrap();
  assert_eq!(keys, vec![digest]);
  assert!(!keys.iter().any(|k| k.contains("super-secret")));
}

#[tokio::test]
async fn schema_declares_no_secondary_indexes() {
  let s = store().await;
  let names: Vec<String> = s
    .conn_for_tests()
    .call(|conn| {
      let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'index' AND sql IS NOT NULL",
      )?;
      let rows = stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
      Ok(rows)
    })
    .await
    .unwrap();
  assert!(names.is_empty(), "unexpected indexes: {names:?}");
}
