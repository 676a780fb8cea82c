//! Full-replace refresh of the local store from the remote endpoint.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use crate::remote::parse_persons;
use crate::store::PersonStore;

/// Outcome of a successful refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
  /// Rows that were in the store before the refresh
  pub removed: usize,
  /// Rows written from the remote payload
  pub inserted: usize,
}

/// Replaces the store contents with whatever the remote endpoint returns.
///
/// There is no diffing: every refresh drops all rows and writes the
/// parsed set. Parsing happens before the store is touched, and the swap
/// itself is a single transaction, so a failed refresh leaves the old rows
/// in place.
#[derive(Clone)]
pub struct Reconciler {
  store: Arc<PersonStore>,
}

impl Reconciler {
  pub fn new(store: Arc<PersonStore>) -> Self {
    Self { store }
  }

  /// True when the store holds no records and should be filled on startup.
  pub fn needs_bootstrap(&self) -> Result<bool> {
    Ok(self.store.count()? == 0)
  }

  /// Fetch, parse and swap in the remote records.
  ///
  /// `fetcher` yields the raw response body, or `None` when the request
  /// failed for any reason.
  pub async fn refresh<F, Fut>(&self, fetcher: F) -> Result<SyncReport>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Option<String>>,
  {
    let body = match fetcher().await {
      Some(body) if !body.trim().is_empty() => body,
      _ => {
        warn!("No data received from remote");
        return Err(eyre!("Failed to fetch data - empty response"));
      }
    };

    let persons = parse_persons(&body).map_err(|e| {
      warn!("Error parsing remote data: {}", e);
      eyre!("Error parsing data: {}", e)
    })?;

    let removed = self.store.replace_all(&persons)?;
    self.store.set_last_synced_at(Utc::now())?;

    info!(removed, inserted = persons.len(), "Refresh complete");

    Ok(SyncReport {
      removed,
      inserted: persons.len(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::person::sample;
  use std::sync::atomic::{AtomicU32, Ordering};

  const PAYLOAD: &str = r#"{"data": [
    {"id": "1", "email": "ada@example.com", "phone": "555-0101",
     "profile": {"name": "Ada", "address": "1 Loop St", "location": {"lat": 1.5, "long": 2.5}}},
    {"id": "2", "email": "grace@example.com", "phone": "555-0102",
     "profile": {"name": "Grace", "address": "2 Loop St", "location": {"lat": 3.5, "long": 4.5}}}
  ]}"#;

  fn reconciler() -> (Reconciler, Arc<PersonStore>) {
    let store = Arc::new(PersonStore::open_in_memory().unwrap());
    (Reconciler::new(store.clone()), store)
  }

  #[tokio::test]
  async fn test_refresh_replaces_store_contents() {
    let (reconciler, store) = reconciler();
    store.insert(&sample("stale", "Old")).unwrap();

    let report = reconciler
      .refresh(|| async { Some(PAYLOAD.to_string()) })
      .await
      .unwrap();

    assert_eq!(
      report,
      SyncReport {
        removed: 1,
        inserted: 2
      }
    );
    let names: Vec<String> = store.list_all().unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Ada", "Grace"]);
    assert!(store.last_synced_at().unwrap().is_some());
  }

  #[tokio::test]
  async fn test_refresh_twice_is_idempotent() {
    let (reconciler, store) = reconciler();

    reconciler
      .refresh(|| async { Some(PAYLOAD.to_string()) })
      .await
      .unwrap();
    let first = store.list_all().unwrap();

    let report = reconciler
      .refresh(|| async { Some(PAYLOAD.to_string()) })
      .await
      .unwrap();
    let second = store.list_all().unwrap();

    assert_eq!(report.removed, 2);
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn test_malformed_payload_keeps_previous_rows() {
    let (reconciler, store) = reconciler();
    store.insert(&sample("keep", "Kept")).unwrap();

    let err = reconciler
      .refresh(|| async { Some("{\"data\": [".to_string()) })
      .await
      .unwrap_err();

    assert!(err.to_string().starts_with("Error parsing data"));
    assert_eq!(store.count().unwrap(), 1);
    assert!(store.get("keep").unwrap().is_some());
    assert!(store.last_synced_at().unwrap().is_none());
  }

  #[tokio::test]
  async fn test_failed_fetch_surfaces_error() {
    let (reconciler, store) = reconciler();
    store.insert(&sample("keep", "Kept")).unwrap();

    let err = reconciler.refresh(|| async { None }).await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to fetch data - empty response");
    assert_eq!(store.count().unwrap(), 1);
  }

  #[tokio::test]
  async fn test_blank_body_counts_as_failed_fetch() {
    let (reconciler, _store) = reconciler();

    let err = reconciler
      .refresh(|| async { Some("  \n".to_string()) })
      .await
      .unwrap_err();

    assert_eq!(err.to_string(), "Failed to fetch data - empty response");
  }

  #[tokio::test]
  async fn test_fetcher_runs_once_per_refresh() {
    let (reconciler, _store) = reconciler();
    let calls = AtomicU32::new(0);

    reconciler
      .refresh(|| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Some("[]".to_string()) }
      })
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_needs_bootstrap_only_when_empty() {
    let (reconciler, store) = reconciler();
    assert!(reconciler.needs_bootstrap().unwrap());

    store.insert(&sample("1", "Ada")).unwrap();
    assert!(!reconciler.needs_bootstrap().unwrap());
  }
}
