//! `addressbook` - An address book with great-circle proximity search
//!
//! This library provides address storage on `SQLite`, the Haversine distance
//! calculation, the full-scan proximity filter built on it, and the HTTP and
//! command-line surfaces around them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod address;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod proximity;
pub mod server;
pub mod storage;

pub use address::{Address, AddressUpdate, NewAddress};
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{distance_km, Coordinate};
pub use logging::init_logging;
pub use proximity::{find_nearby, find_within, AddressSource};
pub use storage::Storage;
