//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::address::{AddressUpdate, NewAddress};
use crate::error::Result;
use crate::geo::Coordinate;
use crate::proximity::validate_radius;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind_addr`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// Latitude in degrees, -90 to 90
    #[arg(long, requires = "longitude", allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Longitude in degrees, -180 to 180
    #[arg(long, requires = "latitude", allow_negative_numbers = true)]
    pub longitude: Option<f64>,
}

impl AddCommand {
    /// Validate the arguments into a storage input.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error for an empty name or a bad coordinate.
    pub fn to_new_address(&self) -> Result<NewAddress> {
        let location = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)?),
            _ => None,
        };
        NewAddress::new(self.name.clone(), location)
    }
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// ID of the address to update
    pub id: i64,

    /// New display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// New longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub longitude: Option<f64>,
}

impl UpdateCommand {
    /// Validate the arguments into a partial update.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error for any bad field.
    pub fn to_update(&self) -> Result<AddressUpdate> {
        let update = AddressUpdate {
            name: self.name.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        };
        update.validate()?;
        Ok(update)
    }
}

/// Get command arguments.
#[derive(Debug, Args)]
pub struct GetCommand {
    /// ID of the address
    pub id: i64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Nearby command arguments.
#[derive(Debug, Args)]
pub struct NearbyCommand {
    /// Latitude of the search center
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude of the search center
    #[arg(long, allow_negative_numbers = true)]
    pub longitude: f64,

    /// Search radius in kilometers
    #[arg(short, long = "distance-km", value_name = "KM")]
    pub distance_km: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl NearbyCommand {
    /// Validate the search center and radius.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if either is out of range.
    pub fn to_query(&self) -> Result<(Coordinate, f64)> {
        let center = Coordinate::new(self.latitude, self.longitude)?;
        validate_radius(self.distance_km)?;
        Ok((center, self.distance_km))
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(lat: Option<f64>, lon: Option<f64>) -> AddCommand {
        AddCommand {
            name: "Home".to_string(),
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn test_add_to_new_address() {
        let new = add(Some(51.5), Some(-0.12)).to_new_address().unwrap();
        assert_eq!(new.location, Some(Coordinate::new(51.5, -0.12).unwrap()));

        let new = add(None, None).to_new_address().unwrap();
        assert!(new.location.is_none());
    }

    #[test]
    fn test_add_rejects_bad_coordinate() {
        let err = add(Some(91.0), Some(0.0)).to_new_address().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_update_to_update() {
        let cmd = UpdateCommand {
            id: 1,
            name: None,
            latitude: Some(-45.0),
            longitude: None,
        };
        let update = cmd.to_update().unwrap();
        assert_eq!(update.latitude, Some(-45.0));

        let cmd = UpdateCommand {
            id: 1,
            name: None,
            latitude: None,
            longitude: Some(181.0),
        };
        assert!(cmd.to_update().is_err());
    }

    #[test]
    fn test_nearby_to_query() {
        let cmd = NearbyCommand {
            latitude: 48.85,
            longitude: 2.35,
            distance_km: 5.0,
            format: OutputFormat::Table,
        };
        let (center, radius) = cmd.to_query().unwrap();
        assert_eq!(center.latitude(), 48.85);
        assert_eq!(radius, 5.0);

        let cmd = NearbyCommand {
            distance_km: -1.0,
            ..cmd
        };
        assert!(cmd.to_query().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }
}
