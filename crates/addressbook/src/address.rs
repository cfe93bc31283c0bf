//! Core address types for addressbook.
//!
//! This module defines the stored address record and the inputs used to
//! create and partially update one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::{self, Coordinate};

/// A stored address.
///
/// Serializes flat as `{id, name, latitude, longitude, created_at, updated_at}`,
/// with `null` coordinates when the record has no location.
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    /// Identifier assigned by the storage layer.
    pub id: i64,

    /// Display name, never empty.
    pub name: String,

    /// Where the address is, if known.
    pub location: Option<Coordinate>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct AddressRow<'a> {
    id: i64,
    name: &'a str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: &'a DateTime<Utc>,
    updated_at: &'a DateTime<Utc>,
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        AddressRow {
            id: self.id,
            name: &self.name,
            latitude: self.latitude(),
            longitude: self.longitude(),
            created_at: &self.created_at,
            updated_at: &self.updated_at,
        }
        .serialize(serializer)
    }
}

impl Address {
    /// Latitude in degrees, if the address has a location.
    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|c| c.latitude())
    }

    /// Longitude in degrees, if the address has a location.
    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|c| c.longitude())
    }
}

/// Input for creating an address.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    /// Display name.
    pub name: String,
    /// Optional location.
    pub location: Option<Coordinate>,
}

impl NewAddress {
    /// Create a validated address input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the name is empty.
    pub fn new(name: impl Into<String>, location: Option<Coordinate>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, location })
    }
}

/// A partial update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AddressUpdate {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New latitude in degrees.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// New longitude in degrees.
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl AddressUpdate {
    /// Check each supplied field independently.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty name or an
    /// out-of-range coordinate half.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(lat) = self.latitude {
            geo::validate_latitude(lat)?;
        }
        if let Some(lon) = self.longitude {
            geo::validate_longitude(lon)?;
        }
        Ok(())
    }

    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.latitude.is_none() && self.longitude.is_none()
    }
}

/// Reject empty names.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `name` has no characters.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_argument("name must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(location: Option<Coordinate>) -> Address {
        Address {
            id: 7,
            name: "Home".to_string(),
            location,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_address_rejects_empty_name() {
        let err = NewAddress::new("", None).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_new_address_keeps_location() {
        let loc = Coordinate::new(10.0, 20.0).unwrap();
        let new = NewAddress::new("Office", Some(loc)).unwrap();
        assert_eq!(new.name, "Office");
        assert_eq!(new.location, Some(loc));
    }

    #[test]
    fn test_serialize_flat_shape() {
        let addr = sample(Some(Coordinate::new(51.5, -0.12).unwrap()));
        let json = serde_json::to_value(&addr).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "Home");
        assert_eq!(json["latitude"], 51.5);
        assert_eq!(json["longitude"], -0.12);
        assert!(json.get("location").is_none());
    }

    #[test]
    fn test_serialize_without_location() {
        let json = serde_json::to_value(sample(None)).unwrap();
        assert!(json["latitude"].is_null());
        assert!(json["longitude"].is_null());
    }

    #[test]
    fn test_accessors() {
        let addr = sample(Some(Coordinate::new(1.0, 2.0).unwrap()));
        assert_eq!(addr.latitude(), Some(1.0));
        assert_eq!(addr.longitude(), Some(2.0));
        assert_eq!(sample(None).latitude(), None);
    }

    #[test]
    fn test_update_validate() {
        let update = AddressUpdate {
            name: Some("New".to_string()),
            latitude: Some(45.0),
            longitude: None,
        };
        assert!(update.validate().is_ok());

        let update = AddressUpdate {
            latitude: Some(95.0),
            ..AddressUpdate::default()
        };
        assert!(update.validate().unwrap_err().is_invalid_argument());

        let update = AddressUpdate {
            name: Some(String::new()),
            ..AddressUpdate::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_update_deserialize_partial() {
        let update: AddressUpdate = serde_json::from_str(r#"{"longitude": 12.5}"#).unwrap();
        assert_eq!(update.longitude, Some(12.5));
        assert!(update.name.is_none());
        assert!(!update.is_empty());

        let empty: AddressUpdate = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
