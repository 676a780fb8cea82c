/// Bump whenever the table layout changes. A database stamped with any
/// other version is dropped and recreated on open.
pub const SCHEMA_VERSION: i64 = 1;

pub const TABLE_NAME: &str = "persons";

pub const DROP_SCHEMA: &str = r#"
DROP TABLE IF EXISTS persons;
DROP TABLE IF EXISTS sync_meta;
"#;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS persons (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    address TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL
);

-- Bookkeeping for the last successful refresh
CREATE TABLE IF NOT EXISTS sync_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

pub const PERSON_COLUMNS: &str = "id, name, email, phone, address, latitude, longitude";
