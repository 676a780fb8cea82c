//! Background task runner with pollable state.
//!
//! A `Query<T>` owns a closure that produces a future. `fetch()` spawns that
//! future on the tokio runtime and `poll()`, called from the UI tick, moves
//! the finished result into the query state. The UI thread never awaits.
//!
//! ```ignore
//! let reconciler = reconciler.clone();
//! let mut query = Query::new(move || {
//!     let reconciler = reconciler.clone();
//!     async move { reconciler.refresh(fetch).await.map_err(|e| e.to_string()) }
//! });
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // Finished, inspect query.state()
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently running
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A boxed future that returns a Result<T, String>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for the background work
type TaskFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Single-flight background task with state management.
///
/// At most one run is in flight: `fetch()` while loading does nothing.
pub struct Query<T> {
  state: QueryState<T>,
  task: TaskFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given task factory.
  ///
  /// The factory is called once per `fetch()`.
  pub fn new<F, Fut>(task: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      task: Box::new(move || Box::pin(task())),
      receiver: None,
    }
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Check if the query is currently running.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Start the task unless a run is already in flight.
  ///
  /// Returns `false` when the call was ignored.
  pub fn fetch(&mut self) -> bool {
    if self.state.is_loading() {
      return false;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.task)();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });

    true
  }

  /// Poll for the result of a pending run.
  ///
  /// Returns `true` if the state changed (result arrived or task died).
  /// Call this in the event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    // Try to receive without blocking
    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Task dropped the sender without reporting (it panicked)
        self.state = QueryState::Error("Task was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });

    assert!(matches!(query.state(), QueryState::Idle));

    assert!(query.fetch());
    assert!(query.is_loading());

    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(query.poll());
    assert_eq!(query.state().data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err("Network error".to_string()) });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(query.poll());
    assert_eq!(query.state().error(), Some("Network error"));
  }

  #[tokio::test]
  async fn test_poll_without_fetch_is_noop() {
    let mut query = Query::new(|| async { Ok::<_, String>(1) });
    assert!(!query.poll());
    assert!(matches!(query.state(), QueryState::Idle));
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_ignored() {
    let runs = Arc::new(AtomicU32::new(0));
    let runs_clone = runs.clone();

    let mut query = Query::new(move || {
      let runs = runs_clone.clone();
      async move {
        runs.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(())
      }
    });

    assert!(query.fetch());
    assert!(!query.fetch());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(query.poll());
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // Once finished, a new run may start
    assert!(query.fetch());
  }
}
