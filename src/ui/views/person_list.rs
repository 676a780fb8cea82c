use crate::app::Services;
use crate::person::Person;
use crate::query::{Query, QueryState};
use crate::sync::SyncReport;
use crate::ui::components::{SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::PersonDetailView;
use chrono::{DateTime, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::{error, info, warn};

/// Root view: every stored person, with refresh and delete
pub struct PersonListView {
  services: Services,
  people: Vec<Person>,
  last_synced: Option<DateTime<Utc>>,
  refresh: Query<SyncReport>,
  list_state: ListState,
  search: SearchInput,
}

impl PersonListView {
  /// Load the stored people, and fetch from the remote if there are none.
  pub fn new(services: Services) -> Self {
    let reconciler = services.reconciler.clone();
    let fetcher = services.fetcher.clone();
    let refresh = Query::new(move || {
      let reconciler = reconciler.clone();
      let fetcher = fetcher.clone();
      async move {
        reconciler
          .refresh(|| async move { fetcher.fetch_configured().await })
          .await
          .map_err(|e| e.to_string())
      }
    });

    let mut view = Self {
      services,
      people: Vec::new(),
      last_synced: None,
      refresh,
      list_state: ListState::default(),
      search: SearchInput::new(),
    };

    view.reload();

    match view.services.reconciler.needs_bootstrap() {
      Ok(true) => {
        info!("Store is empty, fetching from remote");
        view.start_refresh();
      }
      Ok(false) => info!(count = view.people.len(), "Loaded persons from store"),
      Err(e) => view.services.notifier.error(e.to_string()),
    }

    view
  }

  /// Re-read the store into the display list.
  fn reload(&mut self) {
    match self.services.store.list_all() {
      Ok(people) => self.people = people,
      Err(e) => {
        error!("Failed to load persons: {}", e);
        self.services.notifier.error(e.to_string());
      }
    }

    // Missing sync time only affects the header
    self.last_synced = match self.services.store.last_synced_at() {
      Ok(at) => at,
      Err(e) => {
        warn!("Failed to read last sync time: {}", e);
        None
      }
    };

    let len = self.visible().len();
    ensure_valid_selection(&mut self.list_state, len);
  }

  fn start_refresh(&mut self) {
    if self.refresh.fetch() {
      self.services.notifier.info("Fetching data...");
    } else {
      self.services.notifier.info("Refresh already in progress");
    }
  }

  /// People matching the current filter, in store order
  fn visible(&self) -> Vec<&Person> {
    let filter = self.search.query();
    self.people.iter().filter(|p| p.matches(filter)).collect()
  }

  fn selected_person(&self) -> Option<Person> {
    let idx = self.list_state.selected()?;
    self.visible().get(idx).map(|p| (*p).clone())
  }

  fn delete_selected(&mut self) {
    let Some(person) = self.selected_person() else {
      return;
    };

    match self.services.store.delete(&person) {
      Ok(()) => {
        self.reload();
        self.services.notifier.info(format!("{} deleted", person.name));
      }
      Err(e) => {
        error!("Failed to delete {}: {}", person.id, e);
        self.services.notifier.error(e.to_string());
      }
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let visible = self.visible();
    let len = visible.len();

    let title = match self.refresh.state() {
      QueryState::Loading => " People (loading...) ".to_string(),
      _ if !self.search.query().is_empty() => {
        format!(" People ({}/{}) ", len, self.people.len())
      }
      _ => format!(" People ({}) ", len),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if visible.is_empty() {
      let content = if self.refresh.is_loading() {
        "Fetching data..."
      } else if self.refresh.state().error().is_some() {
        "Failed to load people. Press 'r' to retry."
      } else if !self.search.query().is_empty() {
        "No people match the filter."
      } else {
        "No people stored. Press 'r' to fetch."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = visible
      .iter()
      .map(|person| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&person.name, 24)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<16}", truncate(&person.phone_no, 16)),
            Style::default().fg(Color::Yellow),
          ),
          Span::raw(" "),
          Span::raw(format!("{:<30}", truncate(&person.email_id, 30))),
          Span::raw(" "),
          Span::styled(
            truncate(&person.address, 40),
            Style::default().fg(Color::DarkGray),
          ),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    ensure_valid_selection(&mut self.list_state, len);
    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  // Key handling helpers for or_else chain pattern
  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let result = self.search.handle_key(key);
    if !result.is_handled() {
      return None;
    }

    if let Some(SearchEvent::Changed(_)) = result.into_event() {
      // Filter changed, restart from the top of the narrowed list
      self.list_state.select(Some(0));
    }
    Some(ViewAction::None)
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let len = self.visible().len();
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        ensure_valid_selection(&mut self.list_state, len);
        self.list_state.select_next();
        ensure_valid_selection(&mut self.list_state, len);
        Some(ViewAction::None)
      }
      KeyCode::Char('k') | KeyCode::Up => {
        ensure_valid_selection(&mut self.list_state, len);
        self.list_state.select_previous();
        Some(ViewAction::None)
      }
      _ => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('r') => {
        self.start_refresh();
        Some(ViewAction::None)
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        self.delete_selected();
        Some(ViewAction::None)
      }
      KeyCode::Enter => self.selected_person().map(|person| {
        ViewAction::Push(Box::new(PersonDetailView::new(
          person,
          self.services.clone(),
        )))
      }),
      KeyCode::Esc if !self.search.query().is_empty() => {
        // Esc outside the overlay drops a submitted filter
        self.search = SearchInput::new();
        Some(ViewAction::None)
      }
      KeyCode::Char('q') => Some(ViewAction::Quit),
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        Some(ViewAction::Quit)
      }
      _ => None,
    }
  }
}

impl View for PersonListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    if self.search.query().is_empty() {
      "People".to_string()
    } else {
      format!("People [/{}]", self.search.query())
    }
  }

  fn status(&self) -> Option<String> {
    let synced = match self.last_synced {
      Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
      None => "never".to_string(),
    };
    Some(format!("{} records · synced {}", self.people.len(), synced))
  }

  fn tick(&mut self) {
    if !self.refresh.poll() {
      return;
    }

    let outcome = match self.refresh.state() {
      QueryState::Success(report) => Ok(report.inserted),
      QueryState::Error(e) => Err(e.clone()),
      QueryState::Idle | QueryState::Loading => return,
    };

    match outcome {
      Ok(inserted) => {
        self.reload();
        self
          .services
          .notifier
          .info(format!("Data loaded successfully ({} records)", inserted));
      }
      Err(e) => {
        error!("Refresh failed: {}", e);
        self.services.notifier.error(e);
      }
    }
  }

  fn resume(&mut self) {
    self.reload();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("r", "refresh"),
      Shortcut::new("d", "delete"),
      Shortcut::new("enter", "details"),
      Shortcut::new("/", "filter"),
      Shortcut::new("q", "quit"),
    ]
  }
}
