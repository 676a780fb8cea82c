mod app;
mod config;
mod event;
mod logging;
mod person;
mod query;
mod remote;
mod store;
mod sync;
mod ui;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::person::Person;
use crate::remote::HttpFetcher;
use crate::store::PersonStore;
use crate::sync::Reconciler;

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "A terminal UI for a locally cached people directory")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/roster/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Endpoint to fetch people from
  #[arg(short, long)]
  url: Option<String>,

  /// Database file to use
  #[arg(long)]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Replace the stored people with the remote list
  Sync,
  /// Print every stored person
  List,
  /// Print one stored person
  Show { id: String },
  /// Delete one stored person
  Delete { id: String },
  /// Change fields of a stored person
  Update {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    long: Option<f64>,
  },
  /// Delete every stored person
  Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init()?;

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;

  // Command line wins over the config file
  if let Some(url) = args.url {
    config.remote.url = url;
  }
  if let Some(db) = args.db {
    config.database.path = Some(db);
  }

  let store = Arc::new(match &config.database.path {
    Some(path) => PersonStore::open(path)?,
    None => PersonStore::open_default()?,
  });
  let fetcher = HttpFetcher::new(&config.remote, Config::api_token())?;

  match args.command {
    None => {
      let mut app = app::App::new(&config, store, fetcher);
      app.run().await?;
    }
    Some(command) => run_command(command, store, fetcher).await?,
  }

  Ok(())
}

async fn run_command(command: Command, store: Arc<PersonStore>, fetcher: HttpFetcher) -> Result<()> {
  match command {
    Command::Sync => {
      println!("Fetching data from {}...", fetcher.url());
      let report = Reconciler::new(store)
        .refresh(|| async move { fetcher.fetch_configured().await })
        .await?;
      println!(
        "Data loaded successfully ({} records, {} replaced)",
        report.inserted, report.removed
      );
    }
    Command::List => {
      let people = store.list_all()?;
      for person in &people {
        println!(
          "{:<12} {:<24} {:<16} {:<30} {}",
          person.id, person.name, person.phone_no, person.email_id, person.address
        );
      }
      println!("{} records", people.len());
    }
    Command::Show { id } => {
      let person = find(&store, &id)?;
      print_person(&person);
    }
    Command::Delete { id } => {
      let person = find(&store, &id)?;
      store.delete(&person)?;
      println!("{} deleted", person.name);
    }
    Command::Update {
      id,
      name,
      email,
      phone,
      address,
      lat,
      long,
    } => {
      let mut person = find(&store, &id)?;
      if let Some(name) = name {
        person.name = name;
      }
      if let Some(email) = email {
        person.email_id = email;
      }
      if let Some(phone) = phone {
        person.phone_no = phone;
      }
      if let Some(address) = address {
        person.address = address;
      }
      if let Some(lat) = lat {
        person.latitude = lat;
      }
      if let Some(long) = long {
        person.longitude = long;
      }
      let updated = store.update(&person)?;
      println!("{} updated ({} row)", person.name, updated);
    }
    Command::Clear => {
      let removed = store.clear()?;
      println!("{} records deleted", removed);
    }
  }

  Ok(())
}

fn find(store: &PersonStore, id: &str) -> Result<Person> {
  store
    .get(id)?
    .ok_or_else(|| eyre!("No person with id {}", id))
}

fn print_person(person: &Person) {
  println!("Id:       {}", person.id);
  println!("Name:     {}", person.name);
  println!("Email:    {}", person.email_id);
  println!("Phone:    {}", person.phone_no);
  println!("Address:  {}", person.address);
  println!(
    "Location: {}",
    ui::renderfns::format_coordinates(person.latitude, person.longitude)
  );
}
