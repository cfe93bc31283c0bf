//! Storage layer for addressbook.
//!
//! This module provides `SQLite`-based persistent storage for addresses and
//! implements [`AddressSource`] so proximity search can scan it.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::address::{Address, AddressUpdate, NewAddress};
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::proximity::AddressSource;

const SELECT_COLUMNS: &str =
    "SELECT id, name, latitude, longitude, created_at, updated_at FROM addresses";

/// Storage engine for addresses.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then migrates the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let mut conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&mut conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&mut conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new address and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create(&self, new: &NewAddress) -> Result<Address> {
        let now = Utc::now();
        let stamp = now.to_rfc3339();

        self.conn.execute(
            r"
            INSERT INTO addresses (name, latitude, longitude, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ",
            params![
                new.name,
                new.location.map(|c| c.latitude()),
                new.location.map(|c| c.longitude()),
                stamp,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted address with id {}", id);

        Ok(Address {
            id,
            name: new.name.clone(),
            location: new.location,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get an address by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Address>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let result = self
            .conn
            .query_row(&sql, [id], Self::row_to_address)
            .optional()?;
        Ok(result)
    }

    /// Get every address, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self) -> Result<Vec<Address>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let addresses = stmt
            .query_map([], Self::row_to_address)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(addresses)
    }

    /// Apply a partial update.
    ///
    /// Only the fields set in `update` change. A coordinate half is merged
    /// with the stored other half, and the merged pair must be complete.
    /// Returns `None` if no address has this ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the update would leave exactly
    /// one of latitude and longitude set, or an error if the database
    /// operation fails.
    pub fn update(&self, id: i64, update: &AddressUpdate) -> Result<Option<Address>> {
        if update.is_empty() {
            return self.get(id);
        }

        let tx = self.conn.unchecked_transaction()?;
        let stored: Option<(Option<f64>, Option<f64>)> = tx
            .query_row(
                "SELECT latitude, longitude FROM addresses WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((stored_lat, stored_lon)) = stored else {
            debug!("No address with id {} to update", id);
            return Ok(None);
        };

        let latitude = update.latitude.or(stored_lat);
        let longitude = update.longitude.or(stored_lon);
        if latitude.is_some() != longitude.is_some() {
            return Err(Error::invalid_argument(
                "latitude and longitude must be set together",
            ));
        }

        tx.execute(
            r"
            UPDATE addresses SET
                name = COALESCE(?2, name),
                latitude = ?3,
                longitude = ?4,
                updated_at = ?5
            WHERE id = ?1
            ",
            params![id, update.name, latitude, longitude, Utc::now().to_rfc3339()],
        )?;

        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let address = tx.query_row(&sql, [id], Self::row_to_address)?;
        tx.commit()?;
        Ok(Some(address))
    }

    /// Delete an address by ID.
    ///
    /// Returns `true` if an address was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM addresses WHERE id = ?1", [id])?;
        if affected > 0 {
            info!("Deleted address {}", id);
        }
        Ok(affected > 0)
    }

    /// Count stored addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM addresses", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Convert a database row to an Address.
    fn row_to_address(row: &rusqlite::Row) -> rusqlite::Result<Address> {
        let id: i64 = row.get(0)?;
        let name: String = row.get(1)?;
        let latitude: Option<f64> = row.get(2)?;
        let longitude: Option<f64> = row.get(3)?;
        let created_at: String = row.get(4)?;
        let updated_at: String = row.get(5)?;

        let location = Coordinate::from_parts(latitude, longitude);
        if location.is_none() && (latitude.is_some() || longitude.is_some()) {
            warn!("Address {} has an incomplete or invalid location, ignoring it", id);
        }

        Ok(Address {
            id,
            name,
            location,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).map_or_else(
        |_| {
            warn!("Unparseable timestamp {:?}, using epoch", value);
            DateTime::<Utc>::UNIX_EPOCH
        },
        |dt| dt.with_timezone(&Utc),
    )
}

impl AddressSource for Storage {
    fn fetch_all_addresses(&self) -> Result<Vec<Address>> {
        self.list()
    }
}
