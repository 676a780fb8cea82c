use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::remote::HttpFetcher;
use crate::store::PersonStore;
use crate::sync::Reconciler;
use crate::ui;
use crate::ui::components::{Notification, NotificationCenter, Notifier};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::PersonListView;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared handles every view needs
#[derive(Clone)]
pub struct Services {
  pub store: Arc<PersonStore>,
  pub reconciler: Reconciler,
  pub fetcher: HttpFetcher,
  pub notifier: Notifier,
}

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Footer notifications posted by views
  notifications: NotificationCenter,

  /// Header title
  title: String,

  tick_rate: Duration,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, store: Arc<PersonStore>, fetcher: HttpFetcher) -> Self {
    let (notifications, notifier) =
      NotificationCenter::new(Duration::from_secs(config.ui.notification_secs));

    let services = Services {
      reconciler: Reconciler::new(store.clone()),
      store,
      fetcher,
      notifier,
    };

    Self {
      view_stack: vec![Box::new(PersonListView::new(services))],
      notifications,
      title: config.display_title(),
      tick_rate: Duration::from_millis(config.ui.tick_rate_ms),
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
    let mut events = EventHandler::new(self.tick_rate);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    info!("Exiting");
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {
        if let Some(view) = self.view_stack.last_mut() {
          view.tick();
        }
      }
    }
    self.notifications.update();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    let Some(view) = self.view_stack.last_mut() else {
      self.should_quit = true;
      return;
    };

    match view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => self.pop_view(),
      ViewAction::Quit => self.should_quit = true,
    }
  }

  fn pop_view(&mut self) {
    if self.view_stack.len() > 1 {
      self.view_stack.pop();
      if let Some(view) = self.view_stack.last_mut() {
        view.resume();
      }
    } else {
      self.should_quit = true;
    }
  }

  // Accessors for UI rendering
  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn notification(&self) -> Option<&Notification> {
    self.notifications.current()
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}
