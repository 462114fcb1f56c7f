//! SessionState resolver: turns an optional token into a [`Session`].
//!
//! Two read modes:
//!
//! - [`SessionResolver::resolve`] — asynchronous and authoritative; asks the
//!   [`SessionProvider`] every time and refreshes the cache.
//! - [`SessionResolver::cached`] — synchronous; returns the last
//!   authoritative answer for the token while it is younger than the TTL.
//!
//! Resolution is fail-closed: a provider error yields [`Session::Anonymous`].

use std::{
  collections::HashMap,
  sync::{Arc, RwLock},
  time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{
  Error,
  provider::SessionProvider,
  session::{Session, SessionToken},
};

struct CacheEntry {
  session:     Session,
  resolved_at: Instant,
}

pub struct SessionResolver<P> {
  provider: Arc<P>,
  ttl:      Duration,
  cache:    RwLock<HashMap<SessionToken, CacheEntry>>,
}

impl<P: SessionProvider> SessionResolver<P> {
  /// A `ttl` of zero disables the synchronous cache entirely.
  pub fn new(provider: Arc<P>, ttl: Duration) -> Self {
    Self { provider, ttl, cache: RwLock::new(HashMap::new()) }
  }

  /// Authoritative read. Never fails; provider errors resolve to anonymous.
  pub async fn resolve(&self, token: Option<&SessionToken>) -> Session {
    let Some(token) = token else {
      return Session::Anonymous;
    };

    match self.provider.get_session(token).await {
      Ok(Some(record)) => {
        let session = Session::from(record);
        self.store(token, &session);
        session
      }
      Ok(None) => {
        self.evict(token);
        Session::Anonymous
      }
      Err(e) => {
        let err = Error::SessionUnavailable(e.to_string());
        warn!(error = %err, "treating visitor as anonymous");
        self.evict(token);
        Session::Anonymous
      }
    }
  }

  /// Synchronous read of the last authoritative result, if still fresh.
  pub fn cached(&self, token: Option<&SessionToken>) -> Option<Session> {
    let token = token?;
    let cache = self.cache.read().ok()?;
    let entry = cache.get(token)?;
    (entry.resolved_at.elapsed() < self.ttl).then(|| entry.session.clone())
  }

  /// The read used by interactive surfaces. A fresh cached subscriber is
  /// served as is; anything else goes to the provider, so a caller about to
  /// start a payment always acts on the authoritative answer.
  pub async fn interactive(&self, token: Option<&SessionToken>) -> Session {
    if let Some(session) = self.cached(token)
      && session.has_active_subscription()
    {
      debug!("session served from cache");
      return session;
    }
    self.resolve(token).await
  }

  /// Only sessions the provider vouched for are cached, so unknown tokens
  /// never occupy the map.
  fn store(&self, token: &SessionToken, session: &Session) {
    if self.ttl.is_zero() {
      return;
    }
    let Ok(mut cache) = self.cache.write() else {
      return;
    };
    if !cache.contains_key(token) {
      let ttl = self.ttl;
      cache.retain(|_, e| e.resolved_at.elapsed() < ttl);
    }
    cache.insert(token.clone(), CacheEntry {
      session:     session.clone(),
      resolved_at: Instant::now(),
    });
  }

  fn evict(&self, token: &SessionToken) {
    if let Ok(mut cache) = self.cache.write() {
      cache.remove(token);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use super::*;
  use crate::session::SessionRecord;

  #[derive(Debug, thiserror::Error)]
  #[error("identity provider offline")]
  struct Offline;

  #[derive(Default)]
  struct FakeProvider {
    record: Mutex<Option<SessionRecord>>,
    fail:   Mutex<bool>,
    calls:  AtomicUsize,
  }

  impl FakeProvider {
    fn set(&self, sub: Option<&str>) {
      *self.record.lock().unwrap() = Some(SessionRecord {
        subject:             "user-1".into(),
        email:               None,
        active_subscription: sub.map(str::to_owned),
      });
    }
  }

  impl SessionProvider for FakeProvider {
    type Error = Offline;

    async fn get_session(
      &self,
      _token: &SessionToken,
    ) -> Result<Option<SessionRecord>, Offline> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if *self.fail.lock().unwrap() {
        return Err(Offline);
      }
      Ok(self.record.lock().unwrap().clone())
    }
  }

  fn token() -> SessionToken { SessionToken::new("tok").unwrap() }

  fn setup(ttl: u64) -> (Arc<FakeProvider>, SessionResolver<FakeProvider>) {
    let provider = Arc::new(FakeProvider::default());
    let resolver = SessionResolver::new(provider.clone(), Duration::from_secs(ttl));
    (provider, resolver)
  }

  #[tokio::test]
  async fn missing_token_is_anonymous_without_lookup() {
    let (provider, resolver) = setup(60);
    assert_eq!(resolver.resolve(None).await, Session::Anonymous);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn unknown_token_is_anonymous() {
    let (_, resolver) = setup(60);
    assert_eq!(resolver.resolve(Some(&token())).await, Session::Anonymous);
  }

  #[tokio::test]
  async fn provider_failure_fails_closed() {
    let (provider, resolver) = setup(60);
    provider.set(Some("sub_123"));
    *provider.fail.lock().unwrap() = true;
    let session = resolver.resolve(Some(&token())).await;
    assert!(!session.has_active_subscription());
  }

  #[tokio::test]
  async fn authoritative_read_supersedes_stale_cache() {
    let (provider, resolver) = setup(60);
    let t = token();
    provider.set(None);
    resolver.resolve(Some(&t)).await;
    assert!(!resolver.cached(Some(&t)).unwrap().has_active_subscription());

    provider.set(Some("sub_123"));
    // The synchronous read still reports the old answer.
    assert!(!resolver.cached(Some(&t)).unwrap().has_active_subscription());
    // The authoritative read wins and overwrites the cache.
    assert!(resolver.resolve(Some(&t)).await.has_active_subscription());
    assert!(resolver.cached(Some(&t)).unwrap().has_active_subscription());
  }

  #[tokio::test]
  async fn interactive_rechecks_cached_non_subscriber() {
    let (provider, resolver) = setup(60);
    let t = token();
    provider.set(None);
    resolver.resolve(Some(&t)).await;

    provider.set(Some("sub_123"));
    assert!(resolver.interactive(Some(&t)).await.has_active_subscription());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn interactive_serves_cached_subscriber() {
    let (provider, resolver) = setup(60);
    let t = token();
    provider.set(Some("sub_123"));
    resolver.resolve(Some(&t)).await;
    assert!(resolver.interactive(Some(&t)).await.has_active_subscription());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn unknown_and_failed_lookups_are_not_cached() {
    let (provider, resolver) = setup(60);
    let t = token();
    resolver.resolve(Some(&t)).await;
    assert!(resolver.cached(Some(&t)).is_none());

    for i in 0..100 {
      let random = SessionToken::new(format!("junk-{i}")).unwrap();
      resolver.resolve(Some(&random)).await;
    }
    assert!(resolver.cache.read().unwrap().is_empty());

    *provider.fail.lock().unwrap() = true;
    resolver.resolve(Some(&t)).await;
    assert!(resolver.cached(Some(&t)).is_none());
  }

  #[tokio::test]
  async fn revoked_session_is_evicted() {
    let (provider, resolver) = setup(60);
    let t = token();
    provider.set(Some("sub_123"));
    resolver.resolve(Some(&t)).await;
    assert!(resolver.cached(Some(&t)).is_some());

    *provider.record.lock().unwrap() = None;
    assert_eq!(resolver.resolve(Some(&t)).await, Session::Anonymous);
    assert!(resolver.cached(Some(&t)).is_none());
  }

  #[tokio::test]
  async fn zero_ttl_disables_cache() {
    let (provider, resolver) = setup(0);
    let t = token();
    provider.set(Some("sub_123"));
    resolver.resolve(Some(&t)).await;
    assert!(resolver.cached(Some(&t)).is_none());
    resolver.interactive(Some(&t)).await;
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
  }
}
