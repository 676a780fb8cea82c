use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
  Info,
  Error,
}

/// Short-lived message shown in the footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub level: NotificationLevel,
  pub message: String,
}

/// Cloneable handle views use to post notifications to the app.
#[derive(Debug, Clone)]
pub struct Notifier {
  tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
  pub fn info(&self, message: impl Into<String>) {
    self.send(NotificationLevel::Info, message.into());
  }

  pub fn error(&self, message: impl Into<String>) {
    self.send(NotificationLevel::Error, message.into());
  }

  fn send(&self, level: NotificationLevel, message: String) {
    // The app may already be shutting down
    let _ = self.tx.send(Notification { level, message });
  }
}

/// Receiving side: keeps the newest notification until it expires.
#[derive(Debug)]
pub struct NotificationCenter {
  rx: mpsc::UnboundedReceiver<Notification>,
  current: Option<(Notification, Instant)>,
  ttl: Duration,
}

impl NotificationCenter {
  pub fn new(ttl: Duration) -> (Self, Notifier) {
    let (tx, rx) = mpsc::unbounded_channel();
    let center = Self {
      rx,
      current: None,
      ttl,
    };
    (center, Notifier { tx })
  }

  /// Drain pending notifications and drop the current one if expired.
  pub fn update(&mut self) {
    self.update_at(Instant::now());
  }

  fn update_at(&mut self, now: Instant) {
    while let Ok(notification) = self.rx.try_recv() {
      self.current = Some((notification, now));
    }

    if let Some((_, shown_at)) = &self.current {
      if now.duration_since(*shown_at) >= self.ttl {
        self.current = None;
      }
    }
  }

  pub fn current(&self) -> Option<&Notification> {
    self.current.as_ref().map(|(n, _)| n)
  }
}
