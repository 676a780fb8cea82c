pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let title = app.title().to_string();
  let breadcrumb = app.view_breadcrumb();
  let notification = app.notification().cloned();

  if let Some(view) = app.current_view_mut() {
    let status = view.status();
    renderfns::draw_header(frame, chunks[0], &title, status.as_deref(), &view.shortcuts());
    view.render(frame, chunks[1]);
  }

  renderfns::draw_footer(frame, chunks[2], &breadcrumb, notification.as_ref());
}

/// Keep a list selection inside `0..len`, selecting the first row when
/// nothing is selected and clearing it for an empty list.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }

  match state.selected() {
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_selection_starts_at_first_row() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));
  }

  #[test]
  fn test_selection_clamped_after_shrink() {
    let mut state = ListState::default();
    state.select(Some(5));
    ensure_valid_selection(&mut state, 2);
    assert_eq!(state.selected(), Some(1));
  }

  #[test]
  fn test_selection_cleared_for_empty_list() {
    let mut state = ListState::default();
    state.select(Some(0));
    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}
