//! [`SqliteStore`] — the SQLite implementation of [`ContentProvider`] and
//! [`SessionProvider`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use paywall_core::{
  content::{RawDocument, format_updated_at},
  provider::{ContentProvider, SessionProvider},
  session::{SessionRecord, SessionToken},
};

use crate::{
  Error, Result,
  encode::{
    RawDocumentRow, RawSessionRow, encode_blocks, encode_dt,
    publication_sort_key, token_digest,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Documents and sessions backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection {
    &self.conn
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  /// Insert or replace the document with `doc.slug`.
  ///
  /// Rejects empty slugs and publication dates the projector cannot format,
  /// so a stored document is always projectable.
  pub async fn put_document(&self, doc: &RawDocument) -> Result<()> {
    if doc.slug.is_empty() {
      return Err(Error::InvalidDocument("empty slug".into()));
    }
    format_updated_at(&doc.last_publication_date)?;

    let slug         = doc.slug.clone();
    let title_json   = encode_blocks(&doc.title)?;
    let content_json = encode_blocks(&doc.content)?;
    let published    = doc.last_publication_date.clone();
    let stored_at    = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (
             slug, title_json, content_json, last_publication_date, stored_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(slug) DO UPDATE SET
             title_json            = excluded.title_json,
             content_json          = excluded.content_json,
             last_publication_date = excluded.last_publication_date,
             stored_at             = excluded.stored_at",
          rusqlite::params![slug, title_json, content_json, published, stored_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  /// Record a live session for `token`. Only the token's digest is stored.
  pub async fn put_session(
    &self,
    token: &SessionToken,
    record: &SessionRecord,
    expires_at: Option<DateTime<Utc>>,
  ) -> Result<()> {
    let digest  = token_digest(token);
    let subject = record.subject.clone();
    let email   = record.email.clone();
    let sub     = record.active_subscription.clone();
    let expires = expires_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO sessions (
             token_digest, subject, email, active_subscription, expires_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![digest, subject, email, sub, expires],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ContentProvider impl ────────────────────────────────────────────────────

impl ContentProvider for SqliteStore {
  type Error = Error;

  async fn get_document(&self, slug: &str) -> Result<Option<RawDocument>> {
    let slug = slug.to_owned();
    let raw: Option<RawDocumentRow> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            "SELECT slug, title_json, content_json, last_publication_date
             FROM documents WHERE slug = ?1",
            rusqlite::params![slug],
            |row| {
              Ok(RawDocumentRow {
                slug:                  row.get(0)?,
                title_json:            row.get(1)?,
                content_json:          row.get(2)?,
                last_publication_date: row.get(3)?,
              })
            },
          )
          .optional()?;
        Ok(row)
      })
      .await?;

    raw.map(RawDocumentRow::into_document).transpose()
  }

  async fn list_documents(&self) -> Result<Vec<RawDocument>> {
    let raws: Vec<RawDocumentRow> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT slug, title_json, content_json, last_publication_date
           FROM documents",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawDocumentRow {
              slug:                  row.get(0)?,
              title_json:            row.get(1)?,
              content_json:          row.get(2)?,
              last_publication_date: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut docs = raws
      .into_iter()
      .map(RawDocumentRow::into_document)
      .collect::<Result<Vec<_>>>()?;
    docs.sort_by(|a, b| {
      publication_sort_key(&b.last_publication_date)
        .cmp(&publication_sort_key(&a.last_publication_date))
        .then_with(|| a.slug.cmp(&b.slug))
    });
    Ok(docs)
  }
}

// ─── SessionProvider impl ────────────────────────────────────────────────────

impl SessionProvider for SqliteStore {
  type Error = Error;

  async fn get_session(
    &self,
    token: &SessionToken,
  ) -> Result<Option<SessionRecord>> {
    let digest = token_digest(token);
    let raw: Option<RawSessionRow> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            "SELECT subject, email, active_subscription, expires_at
             FROM sessions WHERE token_digest = ?1",
            rusqlite::params![digest],
            |row| {
              Ok(RawSessionRow {
                subject:             row.get(0)?,
                email:               row.get(1)?,
                active_subscription: row.get(2)?,
                expires_at:          row.get(3)?,
              })
            },
          )
          .optional()?;
        Ok(row)
      })
      .await?;

    match raw {
      Some(raw) => raw.into_record(Utc::now()),
      None => Ok(None),
    }
  }
}
