//! SQLite-backed local store of person records.
//!
//! One row per person, keyed by the remote id. There is no data-preserving
//! migration: a schema version mismatch drops and recreates the tables.

mod schema;

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::person::Person;
use schema::{DROP_SCHEMA, PERSON_COLUMNS, SCHEMA, SCHEMA_VERSION, TABLE_NAME};

const LAST_SYNCED_KEY: &str = "last_synced_at";

/// Local person table behind a mutex so it can be shared across tasks.
pub struct PersonStore {
  conn: Mutex<Connection>,
}

impl PersonStore {
  /// Open or create the store at the given path.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create database directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Open or create the store at the default location.
  pub fn open_default() -> Result<Self> {
    Self::open(&Self::default_path()?)
  }

  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory database: {}", e))?;
    Self::with_connection(conn)
  }

  /// Get the default database path
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("roster").join("persons.db"))
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.ensure_schema()?;
    Ok(store)
  }

  /// Create the tables, dropping them first if they were written by a
  /// different schema version.
  fn ensure_schema(&self) -> Result<()> {
    let conn = self.lock()?;

    let version: i64 = conn
      .query_row("PRAGMA user_version", [], |row| row.get(0))
      .map_err(|e| eyre!("Failed to read schema version: {}", e))?;

    if version != SCHEMA_VERSION {
      if version != 0 {
        info!(
          from = version,
          to = SCHEMA_VERSION,
          "Schema version changed, recreating tables"
        );
      }
      conn
        .execute_batch(DROP_SCHEMA)
        .map_err(|e| eyre!("Failed to drop old tables: {}", e))?;
    }

    conn
      .execute_batch(SCHEMA)
      .map_err(|e| eyre!("Failed to create tables: {}", e))?;

    conn
      .pragma_update(None, "user_version", SCHEMA_VERSION)
      .map_err(|e| eyre!("Failed to stamp schema version: {}", e))?;

    Ok(())
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
    self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  /// Insert a person, returning the SQLite row id.
  pub fn insert(&self, person: &Person) -> Result<i64> {
    let conn = self.lock()?;
    insert_row(&conn, person)?;
    let row_id = conn.last_insert_rowid();
    debug!(id = %person.id, row_id, "Inserted person");
    Ok(row_id)
  }

  /// Get a single person by id
  pub fn get(&self, id: &str) -> Result<Option<Person>> {
    let conn = self.lock()?;

    conn
      .query_row(
        &format!("SELECT {PERSON_COLUMNS} FROM {TABLE_NAME} WHERE id = ?"),
        params![id],
        person_from_row,
      )
      .optional()
      .map_err(|e| eyre!("Failed to get person {}: {}", id, e))
  }

  /// All persons in insertion order.
  pub fn list_all(&self) -> Result<Vec<Person>> {
    let conn = self.lock()?;

    let mut stmt = conn
      .prepare(&format!(
        "SELECT {PERSON_COLUMNS} FROM {TABLE_NAME} ORDER BY rowid"
      ))
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let persons = stmt
      .query_map([], person_from_row)
      .map_err(|e| eyre!("Failed to query persons: {}", e))?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(|e| eyre!("Failed to read person row: {}", e))?;

    Ok(persons)
  }

  /// Overwrite every field of the stored record with the same id.
  /// Returns the number of rows changed (0 when the id is unknown).
  pub fn update(&self, person: &Person) -> Result<usize> {
    let conn = self.lock()?;

    conn
      .execute(
        &format!(
          "UPDATE {TABLE_NAME}
           SET name = ?2, email = ?3, phone = ?4, address = ?5, latitude = ?6, longitude = ?7
           WHERE id = ?1"
        ),
        params![
          person.id,
          person.name,
          person.email_id,
          person.phone_no,
          person.address,
          person.latitude,
          person.longitude
        ],
      )
      .map_err(|e| eyre!("Failed to update person {}: {}", person.id, e))
  }

  /// Remove the record with this person's id. Unknown ids are ignored.
  pub fn delete(&self, person: &Person) -> Result<()> {
    let conn = self.lock()?;

    let removed = conn
      .execute(
        &format!("DELETE FROM {TABLE_NAME} WHERE id = ?"),
        params![person.id],
      )
      .map_err(|e| eyre!("Failed to delete person {}: {}", person.id, e))?;

    debug!(id = %person.id, removed, "Deleted person");
    Ok(())
  }

  /// Get persons count
  pub fn count(&self) -> Result<usize> {
    let conn = self.lock()?;

    let count: i64 = conn
      .query_row(&format!("SELECT COUNT(*) FROM {TABLE_NAME}"), [], |row| {
        row.get(0)
      })
      .map_err(|e| eyre!("Failed to count persons: {}", e))?;

    Ok(count as usize)
  }

  /// Delete every record, returning how many were removed.
  pub fn clear(&self) -> Result<usize> {
    let conn = self.lock()?;

    conn
      .execute(&format!("DELETE FROM {TABLE_NAME}"), [])
      .map_err(|e| eyre!("Failed to clear persons: {}", e))
  }

  /// Swap the whole table contents for `persons` in one transaction.
  ///
  /// Either every new row lands and every old row is gone, or nothing
  /// changes. Returns the number of rows that were removed.
  pub fn replace_all(&self, persons: &[Person]) -> Result<usize> {
    let mut conn = self.lock()?;

    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    let removed = tx
      .execute(&format!("DELETE FROM {TABLE_NAME}"), [])
      .map_err(|e| eyre!("Failed to clear persons: {}", e))?;

    for person in persons {
      insert_row(&tx, person)?;
    }

    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    info!(removed, inserted = persons.len(), "Replaced stored persons");
    Ok(removed)
  }

  /// When the last successful refresh finished, if ever.
  pub fn last_synced_at(&self) -> Result<Option<DateTime<Utc>>> {
    let conn = self.lock()?;

    let value: Option<String> = conn
      .query_row(
        "SELECT value FROM sync_meta WHERE key = ?",
        params![LAST_SYNCED_KEY],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read sync metadata: {}", e))?;

    value
      .map(|s| {
        DateTime::parse_from_rfc3339(&s)
          .map(|dt| dt.with_timezone(&Utc))
          .map_err(|e| eyre!("Failed to parse sync time '{}': {}", s, e))
      })
      .transpose()
  }

  pub fn set_last_synced_at(&self, at: DateTime<Utc>) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT OR REPLACE INTO sync_meta (key, value) VALUES (?, ?)",
        params![LAST_SYNCED_KEY, at.to_rfc3339()],
      )
      .map_err(|e| eyre!("Failed to write sync metadata: {}", e))?;

    Ok(())
  }

  /// Run raw SQL against the connection, for putting the store into
  /// states the public API never produces.
  #[cfg(test)]
  pub(crate) fn execute_raw(&self, sql: &str) -> Result<()> {
    let conn = self.lock()?;
    conn
      .execute_batch(sql)
      .map_err(|e| eyre!("Failed to execute raw SQL: {}", e))
  }
}

fn insert_row(conn: &Connection, person: &Person) -> Result<()> {
  conn
    .execute(
      &format!("INSERT INTO {TABLE_NAME} ({PERSON_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"),
      params![
        person.id,
        person.name,
        person.email_id,
        person.phone_no,
        person.address,
        person.latitude,
        person.longitude
      ],
    )
    .map_err(|e| eyre!("Failed to insert person {}: {}", person.id, e))?;
  Ok(())
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
  Ok(Person {
    id: row.get(0)?,
    name: row.get(1)?,
    email_id: row.get(2)?,
    phone_no: row.get(3)?,
    address: row.get(4)?,
    latitude: row.get(5)?,
    longitude: row.get(6)?,
  })
}
