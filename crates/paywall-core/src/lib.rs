//! Core types and decision logic for the paywall.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! defines the session and content models, the provider traits implemented
//! by backends, and the pure access-decision functions.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod content;
pub mod error;
pub mod pricing;
pub mod provider;
pub mod resolver;
pub mod session;

pub use error::{Error, Result};
