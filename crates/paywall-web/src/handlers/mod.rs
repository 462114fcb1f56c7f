pub mod home;
pub mod posts;
pub mod preview;
pub mod subscribe;

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use paywall_core::content::Post;
use serde::Serialize;
use serde_json::json;

/// Body of a redirect response; mirrors the `Location` header.
#[derive(Debug, Serialize)]
pub(super) struct RedirectDescriptor<'a> {
  pub destination: &'a str,
  pub permanent:   bool,
}

/// `307` to `destination` with a JSON descriptor body. Never permanent.
pub(super) fn redirect_response(destination: &str) -> Response {
  let descriptor = RedirectDescriptor { destination, permanent: false };
  (
    StatusCode::TEMPORARY_REDIRECT,
    [(header::LOCATION, destination.to_owned())],
    Json(json!({ "redirect": descriptor })),
  )
    .into_response()
}

pub(super) fn post_response(post: Post) -> Response {
  Json(json!({ "post": post })).into_response()
}
