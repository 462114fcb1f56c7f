//! Content documents and the projector that turns them into payloads.
//!
//! A [`RawDocument`] is what the content provider stores: rich-text blocks
//! plus a raw publication timestamp. Projection serializes those blocks into
//! markup and formats the date once. The preview projection keeps only the
//! first structural block, so its `content` is always a prefix of the full
//! projection's `content`.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, access::AccessDecision};

// ─── Rich text ───────────────────────────────────────────────────────────────

/// The structural type of a rich-text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
  Heading1,
  Heading2,
  Heading3,
  Heading4,
  Heading5,
  Heading6,
  Paragraph,
  Preformatted,
  ListItem,
  OListItem,
}

impl BlockKind {
  /// Element name for standalone blocks; list items are wrapped separately.
  fn tag(self) -> &'static str {
    match self {
      Self::Heading1 => "h1",
      Self::Heading2 => "h2",
      Self::Heading3 => "h3",
      Self::Heading4 => "h4",
      Self::Heading5 => "h5",
      Self::Heading6 => "h6",
      Self::Paragraph => "p",
      Self::Preformatted => "pre",
      Self::ListItem | Self::OListItem => "li",
    }
  }

  fn list_tag(self) -> Option<&'static str> {
    match self {
      Self::ListItem => Some("ul"),
      Self::OListItem => Some("ol"),
      _ => None,
    }
  }
}

/// One block of rich text as stored by the content provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextBlock {
  #[serde(rename = "type")]
  pub kind: BlockKind,
  pub text: String,
}

impl RichTextBlock {
  pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
    Self { kind, text: text.into() }
  }
}

/// Concatenate the plain text of `blocks`, separated by single spaces.
pub fn as_text(blocks: &[RichTextBlock]) -> String {
  blocks
    .iter()
    .map(|b| b.text.as_str())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Serialize `blocks` into markup, one string per structural block.
///
/// Consecutive list items of the same kind form a single structural block.
pub fn structural_blocks(blocks: &[RichTextBlock]) -> Vec<String> {
  let mut out = Vec::new();
  let mut i = 0;
  while i < blocks.len() {
    let kind = blocks[i].kind;
    match kind.list_tag() {
      Some(list) => {
        let mut html = format!("<{list}>");
        while i < blocks.len() && blocks[i].kind == kind {
          html.push_str(&element("li", &blocks[i].text));
          i += 1;
        }
        html.push_str(&format!("</{list}>"));
        out.push(html);
      }
      None => {
        out.push(element(kind.tag(), &blocks[i].text));
        i += 1;
      }
    }
  }
  out
}

fn element(tag: &str, text: &str) -> String {
  format!("<{tag}>{}</{tag}>", escape_html(text))
}

fn escape_html(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A document as held by the content provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
  pub slug:                  String,
  pub title:                 Vec<RichTextBlock>,
  pub content:               Vec<RichTextBlock>,
  /// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date.
  pub last_publication_date: String,
}

/// The delivered payload for a post page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub slug:       String,
  pub title:      String,
  pub content:    String,
  pub updated_at: String,
}

/// An entry in the public post listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
  pub slug:       String,
  pub title:      String,
  pub excerpt:    String,
  pub updated_at: String,
}

// ─── Date formatting ─────────────────────────────────────────────────────────

/// Format a raw publication timestamp as a long-form date
/// (`April 01, 2021`).
///
/// Only the calendar date is used, taken in the timestamp's own offset, so
/// the output does not depend on the server's timezone.
pub fn format_updated_at(raw: &str) -> Result<String> {
  let date = match DateTime::parse_from_rfc3339(raw) {
    Ok(dt) => dt.date_naive(),
    Err(_) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
      .map_err(|_| Error::InvalidTimestamp(raw.to_owned()))?,
  };
  Ok(date.format("%B %d, %Y").to_string())
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// The complete document.
pub fn project_full(doc: &RawDocument) -> Result<Post> {
  Ok(Post {
    slug:       doc.slug.clone(),
    title:      as_text(&doc.title),
    content:    structural_blocks(&doc.content).concat(),
    updated_at: format_updated_at(&doc.last_publication_date)?,
  })
}

/// The document restricted to its first structural block.
pub fn project_preview(doc: &RawDocument) -> Result<Post> {
  Ok(Post {
    slug:       doc.slug.clone(),
    title:      as_text(&doc.title),
    content:    structural_blocks(&doc.content)
      .into_iter()
      .next()
      .unwrap_or_default(),
    updated_at: format_updated_at(&doc.last_publication_date)?,
  })
}

/// A listing entry; the excerpt is the text of the first paragraph.
pub fn project_summary(doc: &RawDocument) -> Result<PostSummary> {
  let excerpt = doc
    .content
    .iter()
    .find(|b| b.kind == BlockKind::Paragraph)
    .map(|b| b.text.clone())
    .unwrap_or_default();
  Ok(PostSummary {
    slug: doc.slug.clone(),
    title: as_text(&doc.title),
    excerpt,
    updated_at: format_updated_at(&doc.last_publication_date)?,
  })
}

/// Project `doc` according to `decision`. A redirect yields no payload.
pub fn project(
  doc: &RawDocument,
  decision: &AccessDecision,
) -> Result<Option<Post>> {
  match decision {
    AccessDecision::Full => project_full(doc).map(Some),
    AccessDecision::Preview => project_preview(doc).map(Some),
    AccessDecision::RedirectTo(_) => Ok(None),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn doc(content: Vec<RichTextBlock>) -> RawDocument {
    RawDocument {
      slug: "my-new-post".into(),
      title: vec![RichTextBlock::new(BlockKind::Heading1, "My new post")],
      content,
      last_publication_date: "2021-04-01T10:30:00+00:00".into(),
    }
  }

  #[test]
  fn preview_of_single_paragraph() {
    let d = doc(vec![RichTextBlock::new(BlockKind::Paragraph, "Post content")]);
    let post = project_preview(&d).unwrap();
    assert_eq!(post, Post {
      slug:       "my-new-post".into(),
      title:      "My new post".into(),
      content:    "<p>Post content</p>".into(),
      updated_at: "April 01, 2021".into(),
    });
  }

  #[test]
  fn preview_is_strict_prefix_of_full() {
    let d = doc(vec![
      RichTextBlock::new(BlockKind::Heading2, "Intro"),
      RichTextBlock::new(BlockKind::Paragraph, "First"),
      RichTextBlock::new(BlockKind::Paragraph, "Second"),
    ]);
    let full = project_full(&d).unwrap();
    let preview = project_preview(&d).unwrap();
    assert_eq!(preview.content, "<h2>Intro</h2>");
    assert!(full.content.starts_with(&preview.content));
    assert!(full.content.len() > preview.content.len());
    assert_eq!(full.title, preview.title);
    assert_eq!(full.updated_at, preview.updated_at);
  }

  #[test]
  fn consecutive_list_items_form_one_block() {
    let d = doc(vec![
      RichTextBlock::new(BlockKind::ListItem, "a"),
      RichTextBlock::new(BlockKind::ListItem, "b"),
      RichTextBlock::new(BlockKind::OListItem, "c"),
    ]);
    let blocks = structural_blocks(&d.content);
    assert_eq!(blocks, vec![
      "<ul><li>a</li><li>b</li></ul>".to_string(),
      "<ol><li>c</li></ol>".to_string(),
    ]);
    let preview = project_preview(&d).unwrap();
    assert_eq!(preview.content, "<ul><li>a</li><li>b</li></ul>");
  }

  #[test]
  fn text_is_escaped() {
    let d = doc(vec![RichTextBlock::new(
      BlockKind::Paragraph,
      "<script>alert(\"x\")</script> & co",
    )]);
    let post = project_full(&d).unwrap();
    assert_eq!(
      post.content,
      "<p>&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; co</p>"
    );
  }

  #[test]
  fn empty_document_projects_to_empty_content() {
    let d = doc(vec![]);
    assert_eq!(project_full(&d).unwrap().content, "");
    assert_eq!(project_preview(&d).unwrap().content, "");
  }

  #[test]
  fn date_uses_timestamp_offset_not_utc() {
    assert_eq!(
      format_updated_at("2021-04-01T23:30:00-03:00").unwrap(),
      "April 01, 2021"
    );
    assert_eq!(format_updated_at("2022-12-25").unwrap(), "December 25, 2022");
  }

  #[test]
  fn malformed_date_is_rejected() {
    assert!(matches!(
      format_updated_at("04=01=2021"),
      Err(Error::InvalidTimestamp(_))
    ));
  }

  #[test]
  fn redirect_projects_nothing() {
    let d = doc(vec![RichTextBlock::new(BlockKind::Paragraph, "secret")]);
    let decision = AccessDecision::RedirectTo("/posts/preview/my-new-post".into());
    assert_eq!(project(&d, &decision).unwrap(), None);
  }

  #[test]
  fn summary_uses_first_paragraph() {
    let d = doc(vec![
      RichTextBlock::new(BlockKind::Heading2, "Intro"),
      RichTextBlock::new(BlockKind::Paragraph, "Excerpt here"),
    ]);
    assert_eq!(project_summary(&d).unwrap().excerpt, "Excerpt here");
  }

  #[test]
  fn block_kind_wire_names() {
    let block: RichTextBlock =
      serde_json::from_str(r#"{"type":"o-list-item","text":"x"}"#).unwrap();
    assert_eq!(block.kind, BlockKind::OListItem);
    let block: RichTextBlock =
      serde_json::from_str(r#"{"type":"heading3","text":"x"}"#).unwrap();
    assert_eq!(block.kind, BlockKind::Heading3);
  }
}
