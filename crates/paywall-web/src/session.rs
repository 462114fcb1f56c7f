//! Session-token extraction.
//!
//! The token is read from the configured cookie first, then from an
//! `Authorization: Bearer` header. A missing or malformed token is not an
//! error; the visitor is simply anonymous.

use std::convert::Infallible;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::CookieJar;
use paywall_core::session::SessionToken;

use crate::{AppState, Backend, Payments};

/// The visitor's session token, if they presented one.
pub struct VisitorToken(pub Option<SessionToken>);

impl VisitorToken {
  pub fn token(&self) -> Option<&SessionToken> { self.0.as_ref() }
}

/// Pull a session token out of `headers`.
pub fn token_from_headers(
  headers: &HeaderMap,
  cookie_name: &str,
) -> Option<SessionToken> {
  let jar = CookieJar::from_headers(headers);
  let from_cookie = jar
    .get(cookie_name)
    .and_then(|cookie| SessionToken::new(cookie.value_trimmed()));

  from_cookie.or_else(|| {
    headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "))
      .and_then(|t| SessionToken::new(t.trim()))
  })
}

impl<B: Backend, P: Payments> FromRequestParts<AppState<B, P>> for VisitorToken {
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<B, P>,
  ) -> Result<Self, Self::Rejection> {
    Ok(VisitorToken(token_from_headers(
      &parts.headers,
      &state.config.session_cookie,
    )))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (k, v) in pairs {
      map.append(k.clone(), HeaderValue::from_str(v).unwrap());
    }
    map
  }

  #[test]
  fn reads_named_cookie() {
    let h = headers(&[(header::COOKIE, "a=1; paywall_session=tok; b=2")]);
    let token = token_from_headers(&h, "paywall_session").unwrap();
    assert_eq!(token.expose(), "tok");
  }

  #[test]
  fn reads_cookie_across_multiple_headers() {
    let h = headers(&[
      (header::COOKIE, "a=1"),
      (header::COOKIE, "paywall_session=\"tok\""),
    ]);
    assert_eq!(token_from_headers(&h, "paywall_session").unwrap().expose(), "tok");
  }

  #[test]
  fn cookie_name_must_match_exactly() {
    let h = headers(&[(header::COOKIE, "paywall_session_old=tok")]);
    assert!(token_from_headers(&h, "paywall_session").is_none());
  }

  #[test]
  fn percent_encoded_cookie_is_decoded() {
    let h = headers(&[(header::COOKIE, "paywall_session=tok%2Fabc")]);
    assert_eq!(token_from_headers(&h, "paywall_session").unwrap().expose(), "tok/abc");
  }

  #[test]
  fn cookie_wins_over_bearer() {
    let h = headers(&[
      (header::AUTHORIZATION, "Bearer other"),
      (header::COOKIE, "paywall_session=tok"),
    ]);
    assert_eq!(token_from_headers(&h, "paywall_session").unwrap().expose(), "tok");
  }

  #[test]
  fn falls_back_to_bearer() {
    let h = headers(&[(header::AUTHORIZATION, "Bearer tok")]);
    assert_eq!(token_from_headers(&h, "paywall_session").unwrap().expose(), "tok");
  }

  #[test]
  fn empty_values_are_anonymous() {
    let h = headers(&[
      (header::COOKIE, "paywall_session="),
      (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
    ]);
    assert!(token_from_headers(&h, "paywall_session").is_none());
  }
}
