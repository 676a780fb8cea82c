/// What a component did with a key press.
///
/// Components report back to their parent view whether they consumed a key,
/// optionally with an event for the view to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the view to do
  Handled,
  /// Consumed, and the view should act on the event
  Event(T),
  /// Not consumed; the view tries its next handler
  NotHandled,
}

impl<T> KeyResult<T> {
  /// True when the component swallowed the key.
  pub fn is_handled(&self) -> bool {
    !matches!(self, KeyResult::NotHandled)
  }

  pub fn into_event(self) -> Option<T> {
    match self {
      KeyResult::Event(event) => Some(event),
      KeyResult::Handled | KeyResult::NotHandled => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_only_not_handled_passes_the_key_on() {
    assert!(KeyResult::<()>::Handled.is_handled());
    assert!(KeyResult::Event(1).is_handled());
    assert!(!KeyResult::<()>::NotHandled.is_handled());
  }

  #[test]
  fn test_into_event_yields_payload() {
    assert_eq!(KeyResult::Event("filter").into_event(), Some("filter"));
    assert_eq!(KeyResult::<&str>::Handled.into_event(), None);
    assert_eq!(KeyResult::<&str>::NotHandled.into_event(), None);
  }
}
