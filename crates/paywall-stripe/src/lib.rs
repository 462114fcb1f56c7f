//! Stripe-backed [`paywall_core::provider::PaymentProvider`].
//!
//! Talks to the Stripe REST API directly over `reqwest`. Only the two calls
//! the paywall needs are implemented: retrieving the subscription price and
//! creating a hosted checkout session.

mod client;
pub mod error;

pub use client::{StripeClient, StripeConfig};
pub use error::{Error, Result};
