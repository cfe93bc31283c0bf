//! Proximity search over stored addresses.
//!
//! Search is a full scan: every record is fetched from an [`AddressSource`]
//! and kept when its great-circle distance to the query point is within
//! the radius. Results keep the fetch order.

use tracing::debug;

use crate::address::Address;
use crate::error::{Error, Result};
use crate::geo::{distance_km, Coordinate};

/// Anything that can hand over every stored address at once.
///
/// This is the seam for swapping in an indexed backend; callers of
/// [`find_nearby`] do not change.
pub trait AddressSource {
    /// Fetch every stored address, fully materialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn fetch_all_addresses(&self) -> Result<Vec<Address>>;
}

impl AddressSource for [Address] {
    fn fetch_all_addresses(&self) -> Result<Vec<Address>> {
        Ok(self.to_vec())
    }
}

impl AddressSource for Vec<Address> {
    fn fetch_all_addresses(&self) -> Result<Vec<Address>> {
        Ok(self.clone())
    }
}

/// Check that a search radius is a finite, non-negative number of kilometers.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] otherwise.
pub fn validate_radius(radius_km: f64) -> Result<()> {
    if radius_km.is_finite() && radius_km >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "radius must be a non-negative number of kilometers, got {radius_km}"
        )))
    }
}

/// Keep the records within `radius_km` of `query`, in input order.
///
/// Records without a location are skipped.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the radius is negative or not finite.
pub fn find_within<I>(query: Coordinate, radius_km: f64, records: I) -> Result<Vec<Address>>
where
    I: IntoIterator<Item = Address>,
{
    validate_radius(radius_km)?;

    Ok(records
        .into_iter()
        .filter(|address| {
            address
                .location
                .is_some_and(|location| distance_km(query, location) <= radius_km)
        })
        .collect())
}

/// Fetch everything from `source` and keep the records within `radius_km`.
///
/// The radius is checked before the fetch. A failed fetch is reported as
/// [`Error::SourceUnavailable`]; nothing is filtered in that case.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for a bad radius and
/// [`Error::SourceUnavailable`] if the fetch fails.
pub fn find_nearby<S>(source: &S, query: Coordinate, radius_km: f64) -> Result<Vec<Address>>
where
    S: AddressSource + ?Sized,
{
    validate_radius(radius_km)?;

    let records = source
        .fetch_all_addresses()
        .map_err(Error::source_unavailable)?;
    let scanned = records.len();

    let matches = find_within(query, radius_km, records)?;
    debug!(
        "Proximity search around {} within {} km matched {} of {} addresses",
        query,
        radius_km,
        matches.len(),
        scanned
    );
    Ok(matches)
}
