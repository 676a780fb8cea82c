use crate::app::Services;
use crate::person::Person;
use crate::ui::renderfns::format_coordinates;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing::error;

/// Full record for one person
pub struct PersonDetailView {
  person: Person,
  services: Services,
}

impl PersonDetailView {
  pub fn new(person: Person, services: Services) -> Self {
    Self { person, services }
  }

  fn field_line(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
      Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
      Span::styled(value, Style::default().fg(Color::White)),
    ])
  }

  fn delete(&self) -> ViewAction {
    match self.services.store.delete(&self.person) {
      Ok(()) => {
        self
          .services
          .notifier
          .info(format!("{} deleted", self.person.name));
        ViewAction::Pop
      }
      Err(e) => {
        error!("Failed to delete {}: {}", self.person.id, e);
        self.services.notifier.error(e.to_string());
        ViewAction::None
      }
    }
  }
}

impl View for PersonDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('d') | KeyCode::Delete => self.delete(),
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let person = &self.person;

    let block = Block::default()
      .title(format!(" {} ", person.name))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let lines = vec![
      Self::field_line("Id", person.id.clone()),
      Self::field_line("Name", person.name.clone()),
      Self::field_line("Email", person.email_id.clone()),
      Self::field_line("Phone", person.phone_no.clone()),
      Self::field_line("Address", person.address.clone()),
      Self::field_line(
        "Location",
        format_coordinates(person.latitude, person.longitude),
      ),
    ];

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.person.name.clone()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new("d", "delete"), Shortcut::new("q", "back")]
  }
}
