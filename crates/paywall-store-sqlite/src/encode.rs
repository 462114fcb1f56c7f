//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps we assign are stored as RFC 3339 strings. Rich-text blocks are
//! stored as compact JSON arrays. Session tokens are stored only as their
//! SHA-256 hex digest.

use chrono::{DateTime, NaiveDate, Utc};
use paywall_core::{
  content::{RawDocument, RichTextBlock},
  session::{SessionRecord, SessionToken},
};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Sort key for a raw publication date. Bare dates sort as midnight UTC;
/// unparseable values sort last.
pub fn publication_sort_key(raw: &str) -> Option<i64> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.timestamp());
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc().timestamp())
}

// ─── Rich text ───────────────────────────────────────────────────────────────

pub fn encode_blocks(blocks: &[RichTextBlock]) -> Result<String> {
  Ok(serde_json::to_string(blocks)?)
}

pub fn decode_blocks(s: &str) -> Result<Vec<RichTextBlock>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

pub fn token_digest(token: &SessionToken) -> String {
  hex::encode(Sha256::digest(token.expose().as_bytes()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `documents` row.
pub struct RawDocumentRow {
  pub slug:                  String,
  pub title_json:            String,
  pub content_json:          String,
  pub last_publication_date: String,
}

impl RawDocumentRow {
  pub fn into_document(self) -> Result<RawDocument> {
    Ok(RawDocument {
      slug:                  self.slug,
      title:                 decode_blocks(&self.title_json)?,
      content:               decode_blocks(&self.content_json)?,
      last_publication_date: self.last_publication_date,
    })
  }
}

/// Raw strings read directly from a `sessions` row.
pub struct RawSessionRow {
  pub subject:             String,
  pub email:               Option<String>,
  pub active_subscription: Option<String>,
  pub expires_at:          Option<String>,
}

impl RawSessionRow {
  /// `None` if the session expired before `now`.
  pub fn into_record(self, now: DateTime<Utc>) -> Result<Option<SessionRecord>> {
    if let Some(expires_at) = self.expires_at.as_deref()
      && decode_dt(expires_at)? <= now
    {
      return Ok(None);
    }
    Ok(Some(SessionRecord {
      subject:             self.subject,
      email:               self.email,
      active_subscription: self.active_subscription,
    }))
  }
}
