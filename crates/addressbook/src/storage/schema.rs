//! `SQLite` schema definitions for addressbook.
//!
//! Each entry in [`MIGRATIONS`] moves the schema up one version; the
//! version a database is at is kept in `PRAGMA user_version`.

/// Version 1: the flat addresses table.
///
/// Latitude and longitude are nullable; a row only has a location when
/// both are set.
pub const CREATE_ADDRESSES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS addresses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// Migration scripts, oldest first. Script `i` produces version `i + 1`.
pub const MIGRATIONS: &[&str] = &[CREATE_ADDRESSES_TABLE];
